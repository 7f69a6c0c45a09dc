//! In-memory session manager and command runner that record one ordered
//! event log, so tests can assert the exact sequence of side effects.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::exec::{CommandRunner, Invocation};
use crate::sessions::SessionManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created(String, PathBuf),
    Broadcast(String, String),
    Console(String, String),
    Ran(String, Vec<String>),
}

type Log = Rc<RefCell<Vec<Event>>>;

pub struct FakeSessions {
    log: Log,
    live: RefCell<BTreeSet<String>>,
}

impl FakeSessions {
    pub fn go_live(&self, id: &str) {
        self.live.borrow_mut().insert(id.to_string());
    }
}

impl SessionManager for FakeSessions {
    fn create(&self, id: &str, workdir: &Path) -> Result<()> {
        if !self.live.borrow_mut().insert(id.to_string()) {
            anyhow::bail!("duplicate session: {}", id);
        }
        self.log
            .borrow_mut()
            .push(Event::Created(id.to_string(), workdir.to_path_buf()));
        Ok(())
    }

    fn send(&self, id: &str, text: &str) -> Result<()> {
        if !self.live.borrow().contains(id) {
            anyhow::bail!("can't find session: {}", id);
        }
        let event = match text.strip_prefix("tellraw @a ") {
            Some(json) => {
                let value: serde_json::Value = serde_json::from_str(json)?;
                let msg = value["text"].as_str().unwrap_or_default().to_string();
                Event::Broadcast(id.to_string(), msg)
            }
            None => Event::Console(id.to_string(), text.to_string()),
        };
        self.log.borrow_mut().push(event);
        Ok(())
    }

    fn list(&self) -> Result<BTreeSet<String>> {
        Ok(self.live.borrow().clone())
    }
}

pub struct RecordingRunner {
    log: Log,
    /// Programs that exit non-zero.
    failing: RefCell<BTreeSet<String>>,
    /// Contents of every `--config=<path>` file at the moment it was run.
    pub captured_configs: RefCell<Vec<String>>,
}

impl RecordingRunner {
    pub fn fail(&self, program: &str) {
        self.failing.borrow_mut().insert(program.to_string());
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        for arg in &args {
            if let Some(path) = arg.strip_prefix("--config=") {
                let content = std::fs::read_to_string(path)?;
                self.captured_configs.borrow_mut().push(content);
            }
        }
        self.log
            .borrow_mut()
            .push(Event::Ran(invocation.program.clone(), args));
        if self.failing.borrow().contains(&invocation.program) {
            anyhow::bail!("{} exited with exit status: 1", invocation.program);
        }
        Ok(())
    }
}

pub struct Harness {
    log: Log,
    pub sessions: FakeSessions,
    pub runner: RecordingRunner,
}

impl Harness {
    pub fn new() -> Self {
        let log: Log = Rc::default();
        Harness {
            sessions: FakeSessions {
                log: log.clone(),
                live: RefCell::default(),
            },
            runner: RecordingRunner {
                log: log.clone(),
                failing: RefCell::default(),
                captured_configs: RefCell::default(),
            },
            log,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Lay out `<root>/<group>/<server>/world` for each entry.
pub fn make_fleet(root: &Path, layout: &[(&str, &[&str])]) {
    for (group, servers) in layout {
        std::fs::create_dir_all(root.join(group)).unwrap();
        for server in *servers {
            std::fs::create_dir_all(root.join(group).join(server).join("world")).unwrap();
        }
    }
}

/// Config rooted at `root` with the default `main`/`extra` groups.
pub fn config_for(root: &Path) -> crate::config::Config {
    crate::config::Config {
        home: root.to_path_buf(),
        ..crate::config::Config::default()
    }
}
