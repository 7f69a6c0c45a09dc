//! External tool invocations, built as argv arrays and run through a
//! [`CommandRunner`] so the lifecycle code never assembles shell strings.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs an invocation to completion. Non-zero exit is an error.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!(command = %invocation, "running");
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        let status = cmd
            .status()
            .with_context(|| format!("failed to run {}", invocation.program))?;
        if !status.success() {
            anyhow::bail!("{} exited with {}", invocation.program, status);
        }
        Ok(())
    }
}

/// `tar -zcf <dest> -C <parent> <name>`: archive a directory with relative entries.
pub fn archive(src_dir: &Path, dest: &Path) -> Result<Invocation> {
    let parent = src_dir
        .parent()
        .with_context(|| format!("cannot archive {}: no parent", src_dir.display()))?;
    let name = src_dir
        .file_name()
        .with_context(|| format!("cannot archive {}: no name", src_dir.display()))?;
    Ok(Invocation::new("tar")
        .arg("-zcf")
        .arg(dest)
        .arg("-C")
        .arg(parent)
        .arg(name))
}

/// `rsync -a --delete <src> <dst_dir>`: `dst_dir/<basename of src>` ends up an exact copy.
pub fn mirror(src: &Path, dst_dir: &Path) -> Invocation {
    Invocation::new("rsync")
        .arg("-a")
        .arg("--delete")
        .arg(src)
        .arg(dst_dir)
}

pub fn render(renderer: &str, config: &Path, genpoi: bool) -> Invocation {
    let mut flag = OsString::from("--config=");
    flag.push(config);
    let inv = Invocation::new(renderer).arg(flag);
    if genpoi { inv.arg("--genpoi") } else { inv }
}
