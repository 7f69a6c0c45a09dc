//! `mcfleet render` — Snapshot worlds and render them as a web map.
//!
//! Usage: mcfleet render [group|server]...
//!
//! The batch, not the server, is the unit of work:
//! 1. Each target's world is mirrored to `<staging_dir>/<server>/world`
//!    (autosave paused while live) and queued in memory
//! 2. The queue is written once to a temporary renderer config
//! 3. The renderer runs twice against it: tiles, then points of interest
//! 4. The config file is removed, whether or not the renderer succeeded

use anyhow::{Context, Result};
use std::io::Write;

use crate::dispatch::{self, Action, DispatchReport, Fleet};
use crate::exec;
use crate::overviewer::{self, Header, WorldRender};
use crate::resolve::Target;
use crate::safety;

/// Per-target step of a render batch; accumulates staged worlds.
#[derive(Debug, Default)]
pub struct Render {
    pub worlds: Vec<WorldRender>,
}

impl Action for Render {
    fn apply(&mut self, fleet: &Fleet, target: &Target) -> Result<()> {
        let server = target.server.as_str();
        eprintln!(":: Rendering server '{}'...", server);

        let world_dir = fleet.catalog.world_dir(&target.group, server);
        let staged = fleet
            .config
            .resolve_path(&fleet.config.staging_dir)
            .join(server);
        std::fs::create_dir_all(&staged)
            .with_context(|| format!("failed to create {}", staged.display()))?;
        let mirror = exec::mirror(&world_dir, &staged);

        let live = fleet.sessions.is_live(server)?;
        eprintln!(":: Copying '{}' world file...", server);
        if live {
            fleet.sessions.broadcast(server, "Copying world file...")?;
            safety::with_saves_paused(&fleet.sessions, server, || {
                fleet.run(&mirror)?;
                fleet.sessions.broadcast(server, "Finished copying world file")
            })?;
        } else {
            fleet.run(&mirror)?;
        }
        eprintln!(":: Finished copying '{}' world file", server);

        self.worlds.push(WorldRender {
            server: server.to_string(),
            world_path: staged.join("world"),
        });

        if live {
            fleet.sessions.broadcast(server, "Starting render...")?;
        }
        eprintln!(":: Starting render of '{}'...", server);
        Ok(())
    }
}

pub fn run(fleet: &Fleet, names: &[String]) -> Result<DispatchReport> {
    let mut batch = Render::default();
    let report = dispatch::dispatch(fleet, &mut batch, names);

    if batch.worlds.is_empty() {
        eprintln!(":: Nothing to render");
        return Ok(report);
    }

    let config = fleet.config;
    let header = Header {
        processes: config.render_processes,
        custom_icons_dir: config.resolve_path(&config.custom_icons_dir),
        output_dir: config.resolve_path(&config.render_output_dir),
    };

    let staging = config.resolve_path(&config.staging_dir);
    let mut file = tempfile::Builder::new()
        .prefix("render_config")
        .suffix(".py")
        .tempfile_in(&staging)
        .with_context(|| format!("failed to create render config in {}", staging.display()))?;
    overviewer::write_config(file.as_file_mut(), &header, &batch.worlds)?;
    file.as_file_mut().flush()?;
    tracing::debug!(path = %file.path().display(), worlds = batch.worlds.len(), "render config written");

    fleet.run(&exec::render(&config.renderer, file.path(), false))?;
    fleet.run(&exec::render(&config.renderer, file.path(), true))?;
    file.close().context("failed to remove render config")?;

    for world in &batch.worlds {
        let live = fleet.sessions.is_live(&world.server).unwrap_or(false);
        if live {
            if let Err(e) = fleet.sessions.broadcast(&world.server, "Render completed") {
                tracing::warn!(server = %world.server, error = %e, "could not announce render");
            }
        }
    }
    eprintln!(":: Render completed");
    Ok(report)
}
