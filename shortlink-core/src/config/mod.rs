//! Configuration system for Shortlink
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Code / CLI flags** - applied by the caller after loading
//! 2. **Environment Variables** (`SL_*`) - override file config
//! 3. **Config File** (`shortlink.toml`) - override defaults
//! 4. **Defaults** - lowest priority
//!
//! # Example
//!
//! ```no_run
//! use shortlink_core::config::ShortlinkConfig;
//!
//! let config = ShortlinkConfig::load()?;
//! let config = ShortlinkConfig::from_file("shortlink.toml")?;
//! let config = ShortlinkConfig::default();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cache;
pub mod logging;
pub mod server;
pub mod storage;

pub use cache::CacheConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "shortlink.toml";

/// Complete Shortlink configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortlinkConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl ShortlinkConfig {
    /// Load configuration with full supersedence chain
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file, which may be absent
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.server.merge(other.server);
        self.cache.merge(other.cache);
        self.storage.merge(other.storage);
        self.logging.merge(other.logging);
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) {
        self.server.apply_env_vars();
        self.cache.apply_env_vars();
        self.storage.apply_env_vars();
        self.logging.apply_env_vars();
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.cache.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
