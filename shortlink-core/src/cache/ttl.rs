//! TTL store seam for cross-process caching
//!
//! [`TtlStore`] is the interface a shared cache service (Redis or similar)
//! is consumed through. Errors are surfaced as [`CacheError::Backend`]; the
//! shortener treats them as misses.

use super::traits::CacheEntry;
use super::{CacheError, CacheResult};
use async_trait::async_trait;
use scc::HashMap as SccHashMap;
use std::time::Duration;

/// Key-value store whose entries expire after a per-entry TTL
#[async_trait]
pub trait TtlStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;
}

struct TtlSlot {
    entry: CacheEntry<String>,
    ttl: Duration,
}

/// In-process [`TtlStore`] backed by a lock-free SCC HashMap
///
/// Expired entries read as absent and are dropped on the read that finds them.
#[derive(Default)]
pub struct MemoryTtlStore {
    entries: SccHashMap<String, TtlSlot>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self {
            entries: SccHashMap::new(),
        }
    }

    /// Number of stored entries, expired ones included until next read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.entries.entry_async(key.to_string()).await {
            scc::hash_map::Entry::Occupied(o) => {
                if o.get().entry.is_expired(o.get().ttl) {
                    let _ = o.remove();
                    return Ok(None);
                }
                Ok(Some(o.get().entry.value.clone()))
            }
            scc::hash_map::Entry::Vacant(_) => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        if ttl.is_zero() {
            return Err(CacheError::Backend("TTL must be greater than zero".to_string()));
        }

        let slot = TtlSlot {
            entry: CacheEntry::new(value.to_string()),
            ttl,
        };
        match self.entries.entry_async(key.to_string()).await {
            scc::hash_map::Entry::Occupied(mut o) => {
                *o.get_mut() = slot;
            }
            scc::hash_map::Entry::Vacant(v) => {
                v.insert_entry(slot);
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove_async(key).await;
        Ok(())
    }
}

/// [`TtlStore`] that stores nothing; every lookup misses
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTtlStore;

#[async_trait]
impl TtlStore for NullTtlStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryTtlStore::new();
        store.set_with_ttl("abc", "https://example.com", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("abc").await.unwrap().as_deref(), Some("https://example.com"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_overwrite() {
        let store = MemoryTtlStore::new();
        store.set_with_ttl("k", "one", Duration::from_secs(60)).await.unwrap();
        store.set_with_ttl("k", "two", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemoryTtlStore::new();
        store.set_with_ttl("k", "v", Duration::from_millis(20)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_zero_ttl_rejected() {
        let store = MemoryTtlStore::new();
        let err = store.set_with_ttl("k", "v", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, CacheError::Backend(_)));
    }

    #[tokio::test]
    async fn test_memory_store_delete() {
        let store = MemoryTtlStore::new();
        store.set_with_ttl("k", "v", Duration::from_secs(60)).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("never-set").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_null_store_always_misses() {
        let store = NullTtlStore;
        store.set_with_ttl("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
