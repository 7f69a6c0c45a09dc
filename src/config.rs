use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory; relative paths below are resolved against it.
    pub home: PathBuf,
    /// Known groups, in tie-break order.
    pub groups: Vec<String>,
    pub backup_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub render_output_dir: PathBuf,
    pub custom_icons_dir: PathBuf,
    /// IANA zone for backup dates and schedule slots.
    pub timezone: String,
    /// Keystrokes that launch a server inside a fresh session.
    pub start_command: String,
    pub renderer: String,
    pub render_processes: u32,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub backup: JobConfig,
    pub render: JobConfig,
    pub poll_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub group: String,
    /// Local time of day, `HH:MM`.
    pub at: String,
    #[serde(default = "one_day")]
    pub every_days: u32,
}

fn one_day() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Config {
            home: home_dir(),
            groups: vec!["main".to_string(), "extra".to_string()],
            backup_dir: PathBuf::from("backups"),
            staging_dir: PathBuf::from("tmp"),
            render_output_dir: PathBuf::from("webserver/render"),
            custom_icons_dir: PathBuf::from("webserver/custom_icons"),
            timezone: "America/New_York".to_string(),
            start_command: "./start.sh".to_string(),
            renderer: "overviewer.py".to_string(),
            render_processes: 4,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            backup: JobConfig {
                group: "extra".to_string(),
                at: "05:00".to_string(),
                every_days: 1,
            },
            render: JobConfig {
                group: "extra".to_string(),
                at: "06:00".to_string(),
                every_days: 7,
            },
            poll_secs: 30,
        }
    }
}

impl Config {
    /// Resolve a configured path against `home` unless it is already absolute.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home.join(path)
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", self.timezone, e))
    }
}

/// Load config from an explicit path, else ~/.config/mcfleet/config.toml, else defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (config_path(), false),
    };
    if !path.exists() {
        if required {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.timezone()?;
    Ok(config)
}

fn config_path() -> PathBuf {
    dirs_config_dir().join("mcfleet").join("config.toml")
}

fn dirs_config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.groups, vec!["main", "extra"]);
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.schedule.render.every_days, 7);
        assert_eq!(config.schedule.poll_secs, 30);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = parse(
            "home = \"/srv/mc\"\ngroups = [\"survival\"]\n\n[schedule.backup]\ngroup = \"survival\"\nat = \"04:30\"\n",
        )
        .unwrap();
        assert_eq!(config.home, PathBuf::from("/srv/mc"));
        assert_eq!(config.groups, vec!["survival"]);
        assert_eq!(config.schedule.backup.at, "04:30");
        assert_eq!(config.schedule.backup.every_days, 1);
        assert_eq!(config.schedule.render.group, "extra");
        assert_eq!(config.renderer, "overviewer.py");
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        let err = parse("timezone = \"Mars/Olympus\"").unwrap_err();
        assert!(err.to_string().contains("invalid timezone"));
    }

    #[test]
    fn relative_paths_resolve_against_home() {
        let config = Config {
            home: PathBuf::from("/srv/mc"),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_path(&config.backup_dir),
            PathBuf::from("/srv/mc/backups")
        );
        assert_eq!(
            config.resolve_path(Path::new("/var/backups")),
            PathBuf::from("/var/backups")
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fleet.toml");
        std::fs::write(&path, "start_command = \"./run.sh\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.start_command, "./run.sh");
    }
}
