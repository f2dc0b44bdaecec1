//! Engine configuration.
//!
//! # Responsibility
//! - Describe where the database lives, how logging is set up and how long
//!   storage calls may wait on locks.
//! - Load those settings from `BLOODBANK_*` environment variables.
//!
//! # Invariants
//! - Every field has a usable default; an empty environment yields an
//!   in-memory database with build-mode log level and no file logging.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "BLOODBANK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BLOODBANK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BLOODBANK_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "BLOODBANK_BUSY_TIMEOUT_MS";

/// Busy timeout used when neither the caller nor the environment sets one.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Runtime settings for opening the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite file path. `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Upper bound for waiting on another connection's write lock.
    pub busy_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Configuration value could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value `{}` for {}", self.value, self.key)
    }
}

impl Error for ConfigError {}

impl EngineConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = raw.parse().map_err(|_| ConfigError {
                key: ENV_BUSY_TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
