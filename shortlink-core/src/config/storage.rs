//! Storage configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Env: SL_STORAGE ("memory" | "file")
    /// Default: memory
    pub backend: StorageBackend,

    /// Directory holding urls.log for the file backend
    /// Env: SL_DATA_DIR
    /// Default: "./data"
    pub data_dir: String,

    /// fsync after every appended event
    /// Env: SL_FSYNC
    /// Default: true
    pub fsync: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: "./data".to_string(),
            fsync: true,
        }
    }
}

impl StorageConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(backend) = env::var("SL_STORAGE") {
            match backend.parse() {
                Ok(b) => self.backend = b,
                Err(e) => log::warn!("Ignoring SL_STORAGE: {}", e),
            }
        }

        if let Ok(dir) = env::var("SL_DATA_DIR") {
            self.data_dir = dir;
        }

        if let Ok(fsync) = env::var("SL_FSYNC") {
            self.fsync = fsync.parse().unwrap_or(self.fsync);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::File && self.data_dir.trim().is_empty() {
            bail!("Invalid storage.data_dir: required for the file backend");
        }
        Ok(())
    }
}
