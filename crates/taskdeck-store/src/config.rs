//! Store configuration.
//!
//! `StoreConfig` is usually embedded as the `[store]` table of a larger TOML
//! file, but it can also be loaded on its own:
//!
//! ```toml
//! path = "/home/me/.local/share/taskdeck/taskdeck.db"
//! pool_size = 4
//! busy_timeout_ms = 5000
//! wal_mode = true
//! ```
//!
//! Every field has a default, so an empty document is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default database file name, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "taskdeck.db";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for the embedded SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Must end in `.db`, `.sqlite` or `.sqlite3`.
    pub path: PathBuf,
    /// Connections kept by the pool.
    pub pool_size: usize,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_ms: u32,
    pub wal_mode: bool,
    /// Page cache per connection, in KiB.
    pub cache_size_kb: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE),
            pool_size: 4,
            busy_timeout_ms: 5000,
            wal_mode: true,
            cache_size_kb: 8 * 1024,
        }
    }
}

impl StoreConfig {
    /// Default settings for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn with_wal_mode(mut self, wal_mode: bool) -> Self {
        self.wal_mode = wal_mode;
        self
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::load_from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn load_from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pool cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid {
                field: "pool_size",
                reason: "must be > 0".to_string(),
            });
        }

        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "path",
                reason: "cannot be empty".to_string(),
            });
        }

        if self.busy_timeout_ms == 0 {
            tracing::warn!("busy_timeout_ms is 0; concurrent writers will fail immediately");
        }

        Ok(())
    }
}
