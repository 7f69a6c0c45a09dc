use std::path::PathBuf;
use thiserror::Error;

/// Errors callers branch on; everything else travels as `anyhow::Error`.
#[derive(Error, Debug)]
pub enum FleetError {
    /// The group's directory does not exist under the fleet home.
    #[error("group '{group}' not found at {}", path.display())]
    GroupNotFound { group: String, path: PathBuf },

    /// A schedule slot that is not a valid `HH:MM` time of day.
    #[error("invalid time of day {0:?} (expected HH:MM)")]
    InvalidTime(String),
}
