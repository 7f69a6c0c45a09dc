//! `mcfleet start` — Start servers in their own tmux sessions.
//!
//! Usage: mcfleet start [group|server]...
//!
//! 1. Skips servers that already have a live session
//! 2. Creates a detached session named after the server, rooted at its home
//! 3. Types the start command into it (fire-and-forget; launch is not verified)

use anyhow::{Context, Result};

use crate::dispatch::{self, Action, DispatchReport, Fleet};
use crate::resolve::Target;

pub struct Start;

impl Action for Start {
    fn apply(&mut self, fleet: &Fleet, target: &Target) -> Result<()> {
        let server = target.server.as_str();
        if fleet.sessions.is_live(server)? {
            eprintln!(":: Server '{}' already started. Skipping...", server);
            return Ok(());
        }

        eprintln!(":: Starting server '{}'...", server);
        let home = fleet.catalog.server_home(&target.group, server);
        fleet
            .sessions
            .create(server, &home)
            .with_context(|| format!("failed to create session for {}", server))?;
        fleet.sessions.console(server, &fleet.config.start_command)
    }
}

pub fn run(fleet: &Fleet, names: &[String]) -> DispatchReport {
    dispatch::dispatch(fleet, &mut Start, names)
}
