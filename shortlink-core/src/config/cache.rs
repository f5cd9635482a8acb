//! Redirect cache configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries held by the in-process LRU cache
    /// Env: SL_CACHE_CAPACITY
    /// Default: 1000
    pub capacity: usize,

    /// Consult the TTL store between the LRU cache and storage
    /// Env: SL_TTL_ENABLED
    /// Default: true
    pub ttl_enabled: bool,

    /// Lifetime of TTL store entries in seconds
    /// Env: SL_CACHE_TTL
    /// Default: 3600
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_enabled: true,
            ttl_seconds: 3600,
        }
    }
}

impl CacheConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(capacity) = env::var("SL_CACHE_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                self.capacity = c;
            }
        }

        if let Ok(enabled) = env::var("SL_TTL_ENABLED") {
            self.ttl_enabled = enabled.parse().unwrap_or(self.ttl_enabled);
        }

        if let Ok(ttl) = env::var("SL_CACHE_TTL") {
            if let Ok(t) = ttl.parse() {
                self.ttl_seconds = t;
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            bail!("Invalid cache.capacity: must be at least 1");
        }

        if self.ttl_enabled && self.ttl_seconds == 0 {
            bail!("Invalid cache.ttl_seconds: must be greater than 0 while the TTL store is on");
        }

        Ok(())
    }
}
