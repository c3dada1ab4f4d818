//! Configuration for processes that host the task list.
//!
//! Settings come from a TOML file, then environment overrides:
//!
//! ```toml
//! [database]
//! url = "postgres://onetask@localhost/onetask"
//! max_connections = 8
//!
//! [tasks]
//! max_text_chars = 500
//! ```
//!
//! The file is read from `ONETASK_CONFIG` when set, otherwise from
//! `./onetask.toml` if present. `DATABASE_URL` replaces `database.url`.
//! Missing files and sections fall back to defaults.

use crate::task::domain::TaskText;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ONETASK_CONFIG";

/// Environment variable overriding the database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "onetask.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`OnetaskConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/onetask".to_owned(),
            max_connections: 8,
        }
    }
}

/// Task input limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Longest accepted task text, in characters.
    pub max_text_chars: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_text_chars: TaskText::MAX_CHARS,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnetaskConfig {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Task input settings.
    pub tasks: TasksConfig,
}

impl OnetaskConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the errors of [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicitly named file is unreadable or
    /// any file is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            std::env::var(DATABASE_URL_ENV).ok(),
        )
    }

    /// Loads configuration from an explicit file path and database override.
    ///
    /// Without `config_path`, [`DEFAULT_CONFIG_FILE`] is used when it exists
    /// and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config_path` is unreadable or any file is
    /// invalid.
    pub fn load_with(
        config_path: Option<PathBuf>,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(url) = database_url.filter(|url| !url.trim().is_empty()) {
            config.database.url = url;
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_owned(),
            ));
        }
        if self.tasks.max_text_chars == 0 {
            return Err(ConfigError::Invalid(
                "tasks.max_text_chars must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
