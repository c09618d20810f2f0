//! Client configuration.
//!
//! The configuration file tells the client where the content API lives and
//! how long fetched content may be reused. Every field is optional; a missing
//! file means the built-in defaults.
//!
//! # File Location
//!
//! - **Unix/macOS**: `~/.cms-content/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\cms-content\config.toml`
//! - **Override**: `--config <PATH>` on the command line
//!
//! # File Format
//!
//! ```toml
//! default_language = "en"
//!
//! [api]
//! base_url = "http://localhost:5000/api"
//! timeout_secs = 15
//! retries = 1
//! retry_delay_ms = 300
//!
//! [cache]
//! stale_time_secs = 300
//! gc_time_secs = 600
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::cache::CacheConfig;
use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_FETCH_RETRIES, DEFAULT_GC_TIME, DEFAULT_LANGUAGE,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_DELAY_MS, DEFAULT_STALE_TIME,
};
use crate::core::ContentError;

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Language used when none is requested
    pub default_language: String,
    /// Content API connection settings
    pub api: ApiConfig,
    /// Query cache windows
    pub cache: CacheSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            api: ApiConfig::default(),
            cache: CacheSettings::default(),
        }
    }
}

/// The `[api]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL of the content API
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after a failed fetch
    pub retries: usize,
    /// Backoff before the first retry, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            retries: DEFAULT_FETCH_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl ApiConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Seconds fetched content counts as fresh
    pub stale_time_secs: u64,
    /// Seconds an unobserved entry is kept before eviction
    pub gc_time_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_time_secs: DEFAULT_STALE_TIME.as_secs(),
            gc_time_secs: DEFAULT_GC_TIME.as_secs(),
        }
    }
}

impl ClientConfig {
    /// Load the configuration from the default location, or defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The default path cannot be determined
    /// - The file exists but cannot be read or parsed
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_with_optional(Some(path)).await
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid TOML
    /// - The values fail [`validate`](Self::validate)
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Platform-specific default path of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory is unknown.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("cms-content")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".cms-content")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Check values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Config`] for an empty base URL or a GC window
    /// shorter than the stale window.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ContentError::Config {
                message: "api.base_url must not be empty".to_string(),
            });
        }

        if self.cache.gc_time_secs < self.cache.stale_time_secs {
            return Err(ContentError::Config {
                message: format!(
                    "cache.gc_time_secs ({}) must not be shorter than cache.stale_time_secs ({})",
                    self.cache.gc_time_secs, self.cache.stale_time_secs
                ),
            });
        }

        Ok(())
    }

    /// Cache policy described by this configuration.
    #[must_use]
    pub const fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            stale_time: Duration::from_secs(self.cache.stale_time_secs),
            gc_time: Duration::from_secs(self.cache.gc_time_secs),
            retries: self.api.retries,
            retry_delay: Duration::from_millis(self.api.retry_delay_ms),
        }
    }
}
