//! Caching module for Shortlink
//!
//! Provides the in-process LRU cache used for redirect lookups, a lock-guarded
//! wrapper for sharing it across request tasks, hit/miss statistics, and the
//! TTL store seam used for cross-process caching.

pub mod lru;
pub mod shared;
pub mod stats;
pub mod traits;
pub mod ttl;

pub use lru::LruCache;
pub use shared::SharedLruCache;
pub use stats::{CacheReport, CacheStats};
pub use traits::{Cache, CacheEntry};
pub use ttl::{MemoryTtlStore, NullTtlStore, TtlStore};

/// Cache error type
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Raised only at construction, when the requested capacity is below 1
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),
    /// Failure reported by an external TTL store backend
    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
