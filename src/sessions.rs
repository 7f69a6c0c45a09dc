//! Session registry — answers "is server X live?" from the session manager.
//!
//! A server's session is named after the server. Nothing is cached: every
//! liveness check asks tmux again, since sessions come and go mid-dispatch.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

/// The narrow slice of a terminal multiplexer this tool needs.
pub trait SessionManager {
    /// Create a detached session rooted at `workdir`.
    fn create(&self, id: &str, workdir: &Path) -> Result<()>;
    /// Type `text` into the session and press Enter.
    fn send(&self, id: &str, text: &str) -> Result<()>;
    /// Names of all active sessions.
    fn list(&self) -> Result<BTreeSet<String>>;
}

/// Tmux server handle — supports isolated `-L` servers for testing.
#[derive(Debug, Clone, Default)]
pub struct Tmux {
    /// If set, uses `-L <socket> -f /dev/null` for an isolated tmux server.
    server_socket: Option<String>,
}

impl Tmux {
    /// Create a Tmux handle that targets the default server (user's tmux).
    pub fn default_server() -> Self {
        Tmux::default()
    }

    /// Build a tmux command with the appropriate `-L` and `-f` flags.
    fn cmd(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(ref socket) = self.server_socket {
            cmd.args(["-L", socket, "-f", "/dev/null"]);
        }
        cmd
    }
}

/// Exact-match pane target for a session (`=name:` so `alpha` never hits `alpha2`).
fn exact_target(id: &str) -> String {
    format!("={}:", id)
}

impl SessionManager for Tmux {
    fn create(&self, id: &str, workdir: &Path) -> Result<()> {
        let output = self
            .cmd()
            .args(["new-session", "-d", "-s", id, "-c"])
            .arg(workdir)
            .output()
            .context("failed to create tmux session")?;
        if !output.status.success() {
            anyhow::bail!(
                "tmux new-session failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(())
    }

    /// Uses `-l` for literal text (no special key interpretation), then sends
    /// Enter separately.
    fn send(&self, id: &str, text: &str) -> Result<()> {
        let target = exact_target(id);
        tracing::debug!(session = id, text, "send-keys");
        let status = self
            .cmd()
            .args(["send-keys", "-t", &target, "-l", text])
            .status()
            .context("failed to run tmux send-keys (text)")?;
        if !status.success() {
            anyhow::bail!("tmux send-keys failed (text) for {}", id);
        }

        let status = self
            .cmd()
            .args(["send-keys", "-t", &target, "Enter"])
            .status()
            .context("failed to run tmux send-keys (enter)")?;
        if !status.success() {
            anyhow::bail!("tmux send-keys failed (enter) for {}", id);
        }
        Ok(())
    }

    /// A tmux server that is not running has no sessions; that is not an error.
    fn list(&self) -> Result<BTreeSet<String>> {
        let output = self
            .cmd()
            .args(["list-sessions", "-F", "#{session_name}"])
            .output()
            .context("failed to run tmux list-sessions")?;
        if !output.status.success() {
            return Ok(BTreeSet::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

/// Test-only methods on Tmux.
#[cfg(test)]
impl Tmux {
    /// Create a Tmux handle that targets an isolated server via `-L`.
    pub fn isolated(socket_name: &str) -> Self {
        Tmux {
            server_socket: Some(socket_name.to_string()),
        }
    }

    /// Kill the tmux server (only useful for isolated test servers).
    pub fn kill_server(&self) -> Result<()> {
        self.cmd()
            .args(["kill-server"])
            .output()
            .context("failed to kill tmux server")?;
        Ok(())
    }
}

/// Liveness queries and console messaging on top of a [`SessionManager`].
pub struct SessionRegistry<'a> {
    manager: &'a dyn SessionManager,
}

impl<'a> SessionRegistry<'a> {
    pub fn new(manager: &'a dyn SessionManager) -> Self {
        SessionRegistry { manager }
    }

    pub fn list_live(&self) -> Result<BTreeSet<String>> {
        self.manager.list()
    }

    pub fn is_live(&self, server: &str) -> Result<bool> {
        Ok(self.list_live()?.contains(server))
    }

    pub fn create(&self, server: &str, workdir: &Path) -> Result<()> {
        self.manager.create(server, workdir)
    }

    /// Run a server console command (e.g. `save-off`).
    pub fn console(&self, server: &str, command: &str) -> Result<()> {
        self.manager.send(server, command)
    }

    /// Show a bold red chat message to every player on the server.
    pub fn broadcast(&self, server: &str, message: &str) -> Result<()> {
        self.console(server, &tellraw(message))
    }
}

fn tellraw(message: &str) -> String {
    let payload = serde_json::json!({
        "text": message,
        "color": "red",
        "bold": true,
    });
    format!("tellraw @a {}", payload)
}
