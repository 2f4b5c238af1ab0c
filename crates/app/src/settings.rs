//! Settings for the `howmuch` binary.
//!
//! Values are layered: built-in defaults, then `config/howmuch.toml` (or the
//! file given with `--config`), then `HOWMUCH_*` environment variables
//! (`HOWMUCH_REMOTE__URL` for `remote.url`), then command-line flags.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/howmuch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl From<String> for Database {
    fn from(value: String) -> Self {
        match value.trim() {
            "memory" | ":memory:" => Database::Memory,
            path => Database::Sqlite(path.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    /// Project url, `/rest/v1` is appended per request.
    pub url: String,
    pub api_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub interval_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub level: String,
    pub database: Database,
    pub remote: Option<Remote>,
    pub sync: SyncSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            database: Database::Sqlite("howmuch.db".to_string()),
            remote: None,
            sync: SyncSettings::default(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "howmuch", version, about = "Offline-first finance store with cloud sync")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the database (`memory` or a SQLite file path).
    #[arg(long, global = true)]
    pub database: Option<String>,
    /// Override the log level.
    #[arg(long, global = true)]
    pub level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mirror the store to the remote until Ctrl-C.
    Sync {
        /// Owner id partitioning the remote rows.
        #[arg(long, env = "HOWMUCH_OWNER")]
        owner: String,
        /// Override the background push period, in seconds.
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Write every record to a JSON backup.
    Export { path: PathBuf },
    /// Replace local records with the content of a JSON backup.
    Import { path: PathBuf },
    /// Delete every record and restore the defaults.
    Reset,
}

pub fn load(args: &Args) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("HOWMUCH")
            .prefix_separator("_")
            .separator("__"),
    );
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(database) = &args.database {
        settings.database = Database::from(database.clone());
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Command::Sync {
        interval: Some(interval),
        ..
    } = args.command
    {
        settings.sync.interval_secs = interval;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_parses_memory_and_paths() {
        assert_eq!(Database::from("memory".to_string()), Database::Memory);
        assert_eq!(
            Database::from(" data/howmuch.db ".to_string()),
            Database::Sqlite("data/howmuch.db".to_string())
        );
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "howmuch",
            "--config",
            "does/not/exist",
            "sync",
            "--owner",
            "u1",
            "--interval",
            "3",
            "--database",
            "memory",
        ])
        .unwrap();
        let settings = load(&args).unwrap();

        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.sync.interval_secs, 3);
        assert!(settings.remote.is_none());
        assert!(matches!(args.command, Command::Sync { ref owner, .. } if owner == "u1"));
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let args = Args::try_parse_from(["howmuch", "--config", "does/not/exist", "reset"]).unwrap();
        let settings = load(&args).unwrap();
        assert_eq!(settings.level, "info");
        assert_eq!(settings.sync.interval_secs, 10);
    }
}
