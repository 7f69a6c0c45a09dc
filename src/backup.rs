//! `mcfleet backup` — Archive server directories to `<backup_dir>/<server>-<date>.gz`.
//!
//! Usage: mcfleet backup [group|server]...
//!
//! The date is taken in the configured zone, not the host's. Reruns on the
//! same day overwrite that day's archive. Live servers get the live-safety
//! protocol; offline ones are archived directly.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::dispatch::{self, Action, DispatchReport, Fleet};
use crate::exec;
use crate::resolve::Target;
use crate::safety;

pub struct Backup;

pub fn archive_name(server: &str, date: NaiveDate) -> String {
    format!("{}-{}.gz", server, date.format("%Y-%m-%d"))
}

pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

impl Action for Backup {
    fn apply(&mut self, fleet: &Fleet, target: &Target) -> Result<()> {
        let server = target.server.as_str();
        let backup_dir = fleet.config.resolve_path(&fleet.config.backup_dir);
        std::fs::create_dir_all(&backup_dir)
            .with_context(|| format!("failed to create {}", backup_dir.display()))?;
        let dest = backup_dir.join(archive_name(server, today(fleet.tz)));
        let archive = exec::archive(&fleet.catalog.server_home(&target.group, server), &dest)?;

        eprintln!(":: Backing up server '{}'...", server);

        if fleet.sessions.is_live(server)? {
            fleet.sessions.broadcast(server, "Backing up server...")?;
            safety::with_saves_paused(&fleet.sessions, server, || {
                fleet.run(&archive)?;
                fleet.sessions.broadcast(server, "Backup completed")
            })?;
        } else {
            fleet.run(&archive)?;
        }

        eprintln!(":: Backup of '{}' completed", server);
        Ok(())
    }
}

pub fn run(fleet: &Fleet, names: &[String]) -> DispatchReport {
    dispatch::dispatch(fleet, &mut Backup, names)
}
