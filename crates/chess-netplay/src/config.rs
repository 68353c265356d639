//! Configuration loading for chess-netplay.
//!
//! Settings come from an optional `netplay.toml`; command-line flags
//! override individual fields.

use chess_engine::DEFAULT_TURN_SECONDS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Config`].
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Connection and clock settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the Host binds and the Joiner connects to.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds each side gets per turn.
    #[serde(default = "default_turn_seconds")]
    pub turn_seconds: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_turn_seconds() -> u32 {
    DEFAULT_TURN_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: default_host(),
            port: default_port(),
            turn_seconds: default_turn_seconds(),
        }
    }
}

impl Config {
    /// Files looked for, in order, when no path is given.
    pub const SEARCH_PATHS: [&'static str; 2] = ["netplay.toml", "../netplay.toml"];

    /// Loads the first config file found in [`Self::SEARCH_PATHS`], or the
    /// defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::SEARCH_PATHS {
            if Path::new(path).exists() {
                let config = Self::from_path(path)?;
                tracing::info!("Loaded config from {}", path);
                return Ok(config);
            }
        }
        tracing::info!("No netplay.toml found, using defaults");
        Ok(Self::default())
    }

    /// Loads the config file at `path`. Unlike [`Self::load`], a missing
    /// file is an error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replaces the fields given on the command line.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        turn_seconds: Option<u32>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(turn_seconds) = turn_seconds {
            self.turn_seconds = turn_seconds;
        }
        self
    }

    /// `host:port`, suitable for binding or connecting.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
