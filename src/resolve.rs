//! Target resolution — turns operator-supplied names into (group, server) pairs.
//!
//! 1. No names → every server of every known group, in group order
//! 2. A group name → every server in that group
//! 3. A server name → the first group (in configured order) that has it
//! 4. Anything else → reported as unresolved; the batch continues
//!
//! Results are not deduplicated: naming a server twice runs it twice.

use std::fmt;

use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub group: String,
    pub server: String,
}

impl Target {
    pub fn new(group: impl Into<String>, server: impl Into<String>) -> Self {
        Target {
            group: group.into(),
            server: server.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.server)
    }
}

/// A server name present in more than one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub name: String,
    /// Every group containing the name; the first one was chosen.
    pub groups: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub targets: Vec<Target>,
    pub unresolved: Vec<String>,
    pub ambiguous: Vec<Ambiguity>,
}

impl Resolution {
    /// Targets that appear more than once, each reported once.
    pub fn duplicates(&self) -> Vec<&Target> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for t in &self.targets {
            if !seen.insert(t) && !dups.contains(&t) {
                dups.push(t);
            }
        }
        dups
    }
}

pub fn resolve(catalog: &Catalog, names: &[String]) -> Resolution {
    let mut res = Resolution::default();

    if names.is_empty() {
        for group in catalog.known_groups() {
            for server in catalog.servers_or_empty(group) {
                res.targets.push(Target::new(group, server));
            }
        }
        return res;
    }

    for name in names {
        if catalog.is_group(name) {
            for server in catalog.servers_or_empty(name) {
                res.targets.push(Target::new(name, server));
            }
            continue;
        }

        let holders: Vec<String> = catalog
            .known_groups()
            .iter()
            .filter(|g| catalog.servers_or_empty(g).iter().any(|s| s == name))
            .cloned()
            .collect();

        match holders.first() {
            Some(group) => {
                res.targets.push(Target::new(group, name));
                if holders.len() > 1 {
                    res.ambiguous.push(Ambiguity {
                        name: name.clone(),
                        groups: holders,
                    });
                }
            }
            None => res.unresolved.push(name.clone()),
        }
    }
    res
}
