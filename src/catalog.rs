//! Fleet catalog — which servers belong to which group.
//!
//! Membership is never cached: each call re-lists `<home>/<group>/`.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::error::FleetError;

#[derive(Debug, Clone)]
pub struct Catalog {
    home: PathBuf,
    groups: Vec<String>,
}

impl Catalog {
    pub fn new(home: impl Into<PathBuf>, groups: Vec<String>) -> Self {
        Catalog {
            home: home.into(),
            groups,
        }
    }

    /// Configured groups, in tie-break order.
    pub fn known_groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
    }

    pub fn group_dir(&self, group: &str) -> PathBuf {
        self.home.join(group)
    }

    pub fn server_home(&self, group: &str, server: &str) -> PathBuf {
        self.home.join(group).join(server)
    }

    pub fn world_dir(&self, group: &str, server: &str) -> PathBuf {
        self.server_home(group, server).join("world")
    }

    /// Server names in a group, sorted. Only directories count as servers.
    pub fn list_servers(&self, group: &str) -> Result<Vec<String>> {
        let dir = self.group_dir(group);
        if !dir.is_dir() {
            return Err(FleetError::GroupNotFound {
                group: group.to_string(),
                path: dir,
            }
            .into());
        }
        let mut servers = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to list {}", dir.display()))?
        {
            let entry = entry?;
            if entry.path().is_dir() {
                servers.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        servers.sort();
        Ok(servers)
    }

    /// Like `list_servers`, but a missing or unreadable group is empty.
    pub fn servers_or_empty(&self, group: &str) -> Vec<String> {
        match self.list_servers(group) {
            Ok(servers) => servers,
            Err(e) => {
                tracing::warn!("{:#}", e);
                Vec::new()
            }
        }
    }
}
