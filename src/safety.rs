//! Live-safety protocol: pause autosave around I/O on a running server's files.
//!
//! `save-off` → `save-all` → io → `save-on`. Once autosave is off and a full
//! save has been forced, the server is assumed not to write its world until
//! `save-on`. Nothing enforces that; the server just honours the commands.

use anyhow::Result;

use crate::sessions::SessionRegistry;

/// Run `io` with autosave paused. `save-on` is sent even when `io` (or the
/// forced save) fails; the first error is the one returned.
pub fn with_saves_paused<T>(
    sessions: &SessionRegistry,
    server: &str,
    io: impl FnOnce() -> Result<T>,
) -> Result<T> {
    sessions.console(server, "save-off")?;
    let result = sessions.console(server, "save-all").and_then(|()| io());
    let resumed = sessions.console(server, "save-on");
    let value = result?;
    resumed?;
    Ok(value)
}
