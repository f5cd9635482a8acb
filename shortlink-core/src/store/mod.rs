//! Durable storage of URL records
//!
//! The [`UrlStore`] trait is what the shortener queries on a cache miss.
//! Two implementations are provided:
//! - [`MemoryUrlStore`] - process-local, lost on restart
//! - [`FileUrlStore`] - append-only event log with CRC32-checked lines

pub mod file;
pub mod memory;

pub use file::FileUrlStore;
pub use memory::MemoryUrlStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A shortened URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Store-assigned id, starting at 1
    pub id: u64,
    pub original_url: String,
    /// Base62 rendering of `id`
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub click_count: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Short code already taken: {0}")]
    DuplicateCode(String),
    #[error("No usable id left for a new short code")]
    IdsExhausted,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of [`UrlStore::get_or_insert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted {
    /// The URL was already shortened
    Existing(UrlRecord),
    Created(UrlRecord),
}

impl Inserted {
    pub fn record(&self) -> &UrlRecord {
        match self {
            Inserted::Existing(r) | Inserted::Created(r) => r,
        }
    }

    pub fn into_record(self) -> UrlRecord {
        match self {
            Inserted::Existing(r) | Inserted::Created(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Inserted::Created(_))
    }
}

/// Maps a candidate id to its short code; `None` skips the id
pub type CodeFor = dyn Fn(u64) -> Option<String> + Sync;

/// Storage interface for URL records
pub trait UrlStore: Send + Sync {
    fn find_by_code(&self, code: &str) -> StoreResult<Option<UrlRecord>>;

    fn find_by_original(&self, original_url: &str) -> StoreResult<Option<UrlRecord>>;

    /// Return the record for `original_url`, creating it if needed
    ///
    /// A new record gets the next id whose `code_for(id)` is `Some`, and that
    /// code. The lookup and the insertion happen under one lock.
    fn get_or_insert(&self, original_url: &str, code_for: &CodeFor) -> StoreResult<Inserted>;

    /// Add one click to the record behind `code`, returning the new count
    fn increment_clicks(&self, code: &str) -> StoreResult<Option<u64>>;

    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory index shared by both store implementations
#[derive(Debug, Default)]
pub(crate) struct UrlTable {
    by_code: HashMap<String, UrlRecord>,
    by_original: HashMap<String, String>,
    last_id: u64,
}

impl UrlTable {
    pub(crate) fn find_by_code(&self, code: &str) -> Option<UrlRecord> {
        self.by_code.get(code).cloned()
    }

    pub(crate) fn find_by_original(&self, original_url: &str) -> Option<UrlRecord> {
        self.by_original.get(original_url).and_then(|code| self.find_by_code(code))
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.last_id + 1
    }

    /// Build (but do not insert) the record the next insertion would create
    pub(crate) fn prepare(&self, original_url: &str, code_for: &CodeFor) -> StoreResult<UrlRecord> {
        let (id, short_code) = (self.next_id()..=u64::MAX)
            .find_map(|id| code_for(id).map(|code| (id, code)))
            .ok_or(StoreError::IdsExhausted)?;
        if self.by_code.contains_key(&short_code) {
            return Err(StoreError::DuplicateCode(short_code));
        }
        Ok(UrlRecord {
            id,
            original_url: original_url.to_string(),
            short_code,
            created_at: Utc::now(),
            click_count: 0,
        })
    }

    pub(crate) fn insert(&mut self, record: UrlRecord) {
        self.last_id = self.last_id.max(record.id);
        self.by_original.insert(record.original_url.clone(), record.short_code.clone());
        self.by_code.insert(record.short_code.clone(), record);
    }

    pub(crate) fn has_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub(crate) fn increment_clicks(&mut self, code: &str) -> Option<u64> {
        let record = self.by_code.get_mut(code)?;
        record.click_count += 1;
        Some(record.click_count)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_code.len()
    }
}
