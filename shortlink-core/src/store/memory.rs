//! Process-local URL store

use super::{CodeFor, Inserted, StoreResult, UrlRecord, UrlStore, UrlTable};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    table: RwLock<UrlTable>,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UrlStore for MemoryUrlStore {
    fn find_by_code(&self, code: &str) -> StoreResult<Option<UrlRecord>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.find_by_code(code))
    }

    fn find_by_original(&self, original_url: &str) -> StoreResult<Option<UrlRecord>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.find_by_original(original_url))
    }

    fn get_or_insert(&self, original_url: &str, code_for: &CodeFor) -> StoreResult<Inserted> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = table.find_by_original(original_url) {
            return Ok(Inserted::Existing(existing));
        }

        let record = table.prepare(original_url, code_for)?;
        table.insert(record.clone());
        Ok(Inserted::Created(record))
    }

    fn increment_clicks(&self, code: &str) -> StoreResult<Option<u64>> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        Ok(table.increment_clicks(code))
    }

    fn len(&self) -> StoreResult<usize> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.len())
    }
}
