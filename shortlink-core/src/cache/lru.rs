//! LRU (Least Recently Used) cache implementation
//!
//! Provides a bounded LRU cache with O(1) get/put operations.
//! Uses a HashMap for fast lookups and an index-linked node arena for recency
//! tracking, so the list carries no reference cycles.

use super::traits::Cache;
use super::{CacheError, CacheResult};
use std::collections::HashMap;
use std::hash::Hash;

/// Node in the recency list
struct LruNode<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K, V> LruNode<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }
}

/// LRU Cache with a fixed capacity
///
/// `head` is the most recently used node, `tail` the next eviction candidate.
pub struct LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    capacity: usize,
    map: HashMap<K, usize>,
    nodes: Vec<LruNode<K, V>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfiguration`] if `capacity` is 0.
    pub fn new(capacity: usize) -> CacheResult<Self> {
        if capacity < 1 {
            return Err(CacheError::InvalidConfiguration(format!(
                "capacity must be at least 1, got {}",
                capacity
            )));
        }

        Ok(Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
        })
    }

    /// Insert or replace a value, returning the entry evicted to make room
    ///
    /// Replacing an existing key never evicts.
    pub fn push(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.move_to_front(idx);
            return None;
        }

        if self.map.len() >= self.capacity {
            if let Some(idx) = self.tail {
                // Reuse the evicted slot for the new entry
                self.unlink(idx);
                let node = LruNode::new(key.clone(), value);
                let evicted = std::mem::replace(&mut self.nodes[idx], node);
                self.map.remove(&evicted.key);
                self.push_front(idx);
                self.map.insert(key, idx);
                return Some((evicted.key, evicted.value));
            }
        }

        let idx = self.nodes.len();
        self.nodes.push(LruNode::new(key.clone(), value));
        self.push_front(idx);
        self.map.insert(key, idx);
        None
    }

    /// Look up a value without refreshing its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Check whether `key` is held, without refreshing its recency
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Iterate entries from most to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cache: self,
            cursor: self.head,
        }
    }

    /// Detach a node from the list, fixing up its neighbours
    fn unlink(&mut self, idx: usize) {
        let (prev_idx, next_idx) = (self.nodes[idx].prev, self.nodes[idx].next);

        match prev_idx {
            Some(prev_idx) => self.nodes[prev_idx].next = next_idx,
            None => self.head = next_idx,
        }

        match next_idx {
            Some(next_idx) => self.nodes[next_idx].prev = prev_idx,
            None => self.tail = prev_idx,
        }

        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    /// Attach a detached node at the front (most recently used)
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        self.nodes[idx].prev = None;
        self.nodes[idx].next = old_head;

        if let Some(old_head_idx) = old_head {
            self.nodes[old_head_idx].prev = Some(idx);
        }

        self.head = Some(idx);

        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Move a node to the front of the list (most recently used)
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at front
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        Some(&self.nodes[idx].value)
    }

    fn put(&mut self, key: K, value: V) {
        self.push(key, value);
    }

    fn size(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("keys", &self.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    cache: &'a LruCache<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.cache.nodes[idx];
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}
