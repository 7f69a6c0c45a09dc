mod backup;
mod catalog;
mod config;
mod dispatch;
mod error;
mod exec;
mod overviewer;
mod render;
mod resolve;
mod safety;
mod schedule;
mod sessions;
mod start;
mod status;
#[cfg(test)]
mod testing;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::dispatch::Fleet;
use crate::exec::SystemRunner;
use crate::schedule::Scheduler;
use crate::sessions::Tmux;

#[derive(Parser)]
#[command(
    name = "mcfleet",
    version,
    about = "Start, back up, and render a fleet of tmux-hosted Minecraft servers"
)]
struct Cli {
    /// Config file (default: ~/.config/mcfleet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Without a subcommand, list running servers
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start servers in their own tmux sessions
    Start {
        /// Groups or servers (default: the whole fleet)
        names: Vec<String>,
    },
    /// Archive server directories into the backup directory
    Backup {
        /// Groups or servers (default: the whole fleet)
        names: Vec<String>,
    },
    /// Snapshot worlds and render them as a web map
    Render {
        /// Groups or servers (default: the whole fleet)
        names: Vec<String>,
    },
    /// Run the configured backup and render jobs forever
    Schedule,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "mcfleet=info".into()),
    );
    // stdout is reserved for the session listing
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = config::load(cli.config.as_deref())?;
    let tmux = Tmux::default_server();
    let runner = SystemRunner;
    let fleet = Fleet::new(&config, &tmux, &runner)?;

    match cli.command {
        None => status::run(&fleet.sessions),
        Some(Commands::Start { names }) => {
            start::run(&fleet, &names);
            Ok(())
        }
        Some(Commands::Backup { names }) => {
            backup::run(&fleet, &names);
            Ok(())
        }
        Some(Commands::Render { names }) => render::run(&fleet, &names).map(|_| ()),
        Some(Commands::Schedule) => {
            let mut scheduler = Scheduler::new(fleet.tz);
            let now = scheduler.now();
            schedule::register(&mut scheduler, &fleet, now)?;
            if let Some(next) = scheduler.next_run() {
                eprintln!(":: Scheduler running, next job at {}", next);
            }
            scheduler.run_forever(Duration::from_secs(config.schedule.poll_secs.max(1)))
        }
    }
}
