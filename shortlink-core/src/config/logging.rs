//! Logging configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Env: SL_LOG_LEVEL. `RUST_LOG`, when set, still takes precedence.
    pub level: String,
    pub module_path: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            module_path: false,
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("SL_LOG_LEVEL") {
            self.level = level;
        }
    }

    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        self.level.parse().ok()
    }

    pub fn validate(&self) -> Result<()> {
        if self.level_filter().is_none() {
            bail!("Invalid logging.level: {}", self.level);
        }
        Ok(())
    }
}
