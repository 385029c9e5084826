//! `taskdeck.toml` loading.
//!
//! ```toml
//! [store]
//! path = "taskdeck.db"
//!
//! [logging]
//! level = "info"
//! format = "text"
//!
//! [ui]
//! date_format = "dd/MM/yyyy HH:mm:ss"
//! show_completed = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taskdeck_core::datefmt::LISTING_PATTERN;
use taskdeck_store::{ConfigError, StoreConfig};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "taskdeck.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub date_format: String,
    pub show_completed: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: LISTING_PATTERN.to_string(),
            show_completed: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskdeckConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

impl TaskdeckConfig {
    /// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] when it exists,
    /// else defaults. An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.store.validate()?;
        Ok(config)
    }

    /// Point the store at `path` instead of the configured file.
    pub fn with_db_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.store.path = path;
        }
        self
    }
}
