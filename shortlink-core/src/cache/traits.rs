//! Core traits for caching functionality

use std::hash::Hash;
use std::time::{Duration, Instant};

/// A cache entry stamped with its creation time
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When this entry was created
    pub created_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create a new cache entry
    pub fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    /// Check if this entry has outlived `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Core caching trait
///
/// Lookups take `&mut self` because a hit reorders recency.
pub trait Cache<K, V>
where
    K: Hash + Eq,
{
    /// Get a value from the cache, marking it most recently used
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Insert or replace a value, evicting the least recently used entry if full
    fn put(&mut self, key: K, value: V);

    /// Get the number of entries in the cache
    fn size(&self) -> usize;

    /// Check if the cache is empty
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Get the capacity of the cache
    fn capacity(&self) -> usize;
}
