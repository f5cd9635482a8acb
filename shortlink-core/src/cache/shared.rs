//! Lock-guarded LRU cache for sharing across request tasks
//!
//! Both `get` and `put` reorder recency, so a single exclusive lock guards
//! every operation. The lock is never held across an await point or while
//! calling back into caller code.

use super::lru::LruCache;
use super::traits::Cache;
use super::CacheResult;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe handle over an [`LruCache`]
///
/// Values are cloned out on lookup so no borrow outlives the lock.
pub struct SharedLruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    inner: Mutex<LruCache<K, V>>,
    capacity: usize,
}

impl<K, V> SharedLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> CacheResult<Self> {
        Ok(Self {
            inner: Mutex::new(LruCache::new(capacity)?),
            capacity,
        })
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    pub fn size(&self) -> usize {
        self.lock().size()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still holds a consistent list.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
