//! Persistent configuration for parley-cli.
//!
//! Config file lives at `~/.config/parley/config.toml`. CLI flags and
//! `PARLEY_*` environment variables (handled by clap) override it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_READ_PORT: u16 = 5000;
pub const DEFAULT_SEND_PORT: u16 = 5050;
pub const DEFAULT_HISTORY: &str = "parley-history.txt";

/// User configuration (persisted in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Chat server hostname.
    pub host: Option<String>,
    /// Port of the broadcast feed.
    pub read_port: Option<u16>,
    /// Port for authenticated message submission.
    pub send_port: Option<u16>,
    /// Personal auth token.
    pub token: Option<String>,
    /// Chat history file path.
    pub history: Option<PathBuf>,
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parley")
        .join("config.toml")
}

impl FileConfig {
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => return c,
                    Err(e) => eprintln!("Warning: bad config file {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: can't read {}: {e}", path.display()),
            }
        }
        Self::default()
    }
}

/// Effective settings: CLI/env > config file > defaults.
pub struct Resolved {
    pub host: String,
    pub read_port: u16,
    pub send_port: u16,
    pub token: Option<String>,
    pub history: PathBuf,
}

impl Resolved {
    pub fn merge(cli: &crate::Cli, file: &FileConfig) -> Self {
        Self {
            host: cli
                .host
                .clone()
                .or_else(|| file.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            read_port: cli.read_port.or(file.read_port).unwrap_or(DEFAULT_READ_PORT),
            send_port: cli.send_port.or(file.send_port).unwrap_or(DEFAULT_SEND_PORT),
            token: cli.token.clone().or_else(|| file.token.clone()),
            history: cli
                .history
                .clone()
                .or_else(|| file.history.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY)),
        }
    }
}
