//! Dispatcher — resolve names, then apply one action per target, in order.
//!
//! A failing target is reported and skipped; it never stops the batch.

use anyhow::Result;
use chrono_tz::Tz;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::exec::{CommandRunner, Invocation};
use crate::resolve::{self, Target};
use crate::sessions::{SessionManager, SessionRegistry};

/// Everything an action needs to touch the outside world.
pub struct Fleet<'a> {
    pub config: &'a Config,
    pub catalog: Catalog,
    pub sessions: SessionRegistry<'a>,
    pub runner: &'a dyn CommandRunner,
    pub tz: Tz,
}

impl<'a> Fleet<'a> {
    pub fn new(
        config: &'a Config,
        manager: &'a dyn SessionManager,
        runner: &'a dyn CommandRunner,
    ) -> Result<Self> {
        Ok(Fleet {
            config,
            catalog: Catalog::new(config.home.clone(), config.groups.clone()),
            sessions: SessionRegistry::new(manager),
            runner,
            tz: config.timezone()?,
        })
    }

    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        self.runner.run(invocation)
    }
}

/// A per-target lifecycle operation.
pub trait Action {
    fn apply(&mut self, fleet: &Fleet, target: &Target) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub completed: Vec<Target>,
    pub failed: Vec<(Target, anyhow::Error)>,
    pub unresolved: Vec<String>,
}

pub fn dispatch(fleet: &Fleet, action: &mut dyn Action, names: &[String]) -> DispatchReport {
    let resolution = resolve::resolve(&fleet.catalog, names);

    for amb in &resolution.ambiguous {
        tracing::warn!(
            name = %amb.name,
            groups = ?amb.groups,
            "server exists in several groups; using '{}'",
            amb.groups[0]
        );
    }
    for dup in resolution.duplicates() {
        tracing::warn!(server = %dup, "target named more than once; it will run repeatedly");
    }
    for name in &resolution.unresolved {
        eprintln!(":: Server or group '{}' does not exist. Skipping...", name);
    }

    let mut report = DispatchReport {
        unresolved: resolution.unresolved,
        ..DispatchReport::default()
    };
    for target in resolution.targets {
        match action.apply(fleet, &target) {
            Ok(()) => report.completed.push(target),
            Err(e) => {
                eprintln!(":: '{}' failed: {:#}", target.server, e);
                tracing::debug!(server = %target, error = %format!("{:#}", e), "action failed");
                report.failed.push((target, e));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Harness};
    use tempfile::TempDir;

    /// Records every target and fails the ones named in `fail`.
    #[derive(Default)]
    struct Probe {
        seen: Vec<String>,
        fail: Vec<&'static str>,
    }

    impl Action for Probe {
        fn apply(&mut self, _fleet: &Fleet, target: &Target) -> Result<()> {
            self.seen.push(target.server.clone());
            if self.fail.contains(&target.server.as_str()) {
                anyhow::bail!("disk full");
            }
            Ok(())
        }
    }

    #[test]
    fn failure_of_one_target_does_not_stop_the_rest() {
        let dir = TempDir::new().unwrap();
        testing::make_fleet(dir.path(), &[("main", &["alpha", "beta", "gamma"])]);
        let config = testing::config_for(dir.path());
        let h = Harness::new();
        let fleet = Fleet::new(&config, &h.sessions, &h.runner).unwrap();

        let mut probe = Probe {
            fail: vec!["beta"],
            ..Probe::default()
        };
        let report = dispatch(&fleet, &mut probe, &["main".to_string(), "ghost".to_string()]);

        assert_eq!(probe.seen, vec!["alpha", "beta", "gamma"]);
        assert_eq!(
            report.completed,
            vec![Target::new("main", "alpha"), Target::new("main", "gamma")]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Target::new("main", "beta"));
        assert_eq!(report.failed[0].1.to_string(), "disk full");
        assert_eq!(report.unresolved, vec!["ghost"]);
    }

    #[test]
    fn duplicate_targets_run_each_time() {
        let dir = TempDir::new().unwrap();
        testing::make_fleet(dir.path(), &[("main", &["alpha"])]);
        let config = testing::config_for(dir.path());
        let h = Harness::new();
        let fleet = Fleet::new(&config, &h.sessions, &h.runner).unwrap();

        let mut probe = Probe::default();
        dispatch(&fleet, &mut probe, &["main".to_string(), "alpha".to_string()]);
        assert_eq!(probe.seen, vec!["alpha", "alpha"]);
    }
}
