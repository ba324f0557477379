//! Configuration management for bookify.
//!
//! Settings live in `config.toml` inside the config directory. Every key is
//! optional; a missing file means defaults.

use bookify_client::{ClientConfig, DEFAULT_BASE_URL};
use bookify_core::{BOOK_PAGE_SIZES, DEFAULT_BOOK_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Errors while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for these settings.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A value is out of range.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Settings stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Default books page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    DEFAULT_BOOK_PAGE_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl Settings {
    /// Path of the settings file in `config_dir`.
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Load settings from `config_dir`. A missing file yields defaults.
    pub async fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(config_dir);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::ReadError { path, source }),
        };
        let settings: Self =
            toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
                path: path.clone(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings to `config_dir`, creating it if needed.
    pub async fn save(&self, config_dir: &Path) -> Result<PathBuf, ConfigError> {
        self.validate()?;
        let path = Self::path(config_dir);
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        tokio::fs::create_dir_all(config_dir)
            .await
            .map_err(|source| ConfigError::WriteError {
                path: path.clone(),
                source,
            })?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| ConfigError::WriteError {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if !BOOK_PAGE_SIZES.contains(&self.page_size) {
            return Err(ConfigError::Invalid(format!(
                "page_size must be one of {:?}",
                BOOK_PAGE_SIZES
            )));
        }
        Ok(())
    }

    /// Client configuration, with `api_url` overridden if given.
    pub fn client_config(&self, api_url: Option<&str>) -> ClientConfig {
        ClientConfig::new(api_url.unwrap_or(&self.api_url))
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
