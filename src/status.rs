//! `mcfleet` with no subcommand — list running servers.

use anyhow::Result;
use std::io::Write;

use crate::sessions::SessionRegistry;

pub fn run(sessions: &SessionRegistry) -> Result<()> {
    let stdout = std::io::stdout();
    print_live(sessions, &mut stdout.lock())
}

fn print_live(sessions: &SessionRegistry, out: &mut impl Write) -> Result<()> {
    let live = sessions.list_live()?;
    writeln!(out, "Running servers:")?;
    for name in &live {
        writeln!(out, "{}", name)?;
    }
    writeln!(out, "Total number of running servers: {}", live.len())?;
    Ok(())
}
