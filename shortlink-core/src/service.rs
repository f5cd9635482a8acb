//! URL shortening service
//!
//! [`Shortener`] ties the durable [`UrlStore`] to the two cache layers. A
//! redirect lookup goes LRU cache → TTL store → storage; the first two count
//! as hits, reaching storage counts as a miss and warms both caches.

use crate::cache::{CacheReport, CacheResult, CacheStats, SharedLruCache, TtlStore};
use crate::codec::{code_for_id, validate_code};
use crate::store::{Inserted, StoreError, StoreResult, UrlRecord, UrlStore};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Longest original URL accepted by [`Shortener::shorten`]
pub const MAX_URL_LEN: usize = 2048;

const TTL_KEY_PREFIX: &str = "url:";

#[derive(thiserror::Error, Debug)]
pub enum ShortenError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid code format")]
    InvalidCode(String),
    #[error("Not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ShortenError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShortenError::InvalidUrl(_) | ShortenError::InvalidCode(_) => StatusCode::BAD_REQUEST,
            ShortenError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortenError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable snake_case identifier for JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            ShortenError::InvalidUrl(_) => "invalid_url",
            ShortenError::InvalidCode(_) => "invalid_code",
            ShortenError::NotFound(_) => "not_found",
            ShortenError::Storage(_) => "storage_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenRequest {
    pub original_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlStats {
    pub short_code: String,
    pub original_url: String,
    pub click_count: u64,
    /// RFC 3339
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub report: CacheReport,
    pub size: usize,
    pub capacity: usize,
}

/// Tunables for a [`Shortener`]
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    pub cache_capacity: usize,
    pub ttl: Duration,
    /// Prefix of generated short URLs, without trailing slash
    pub base_url: String,
}

pub struct Shortener {
    store: Arc<dyn UrlStore>,
    lru: SharedLruCache<String, String>,
    ttl_store: Arc<dyn TtlStore>,
    ttl: Duration,
    stats: Arc<CacheStats>,
    base_url: String,
}

impl Shortener {
    /// # Errors
    ///
    /// Fails with `CacheError::InvalidConfiguration` when the cache capacity is 0.
    pub fn new(
        store: Arc<dyn UrlStore>,
        ttl_store: Arc<dyn TtlStore>,
        stats: Arc<CacheStats>,
        settings: ShortenerSettings,
    ) -> CacheResult<Self> {
        Ok(Self {
            store,
            lru: SharedLruCache::new(settings.cache_capacity)?,
            ttl_store,
            ttl: settings.ttl,
            stats,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shorten `original_url`, reusing the existing code if it was shortened before
    pub async fn shorten(&self, original_url: &str) -> Result<ShortenResponse, ShortenError> {
        let original = normalize_url(original_url)?;
        let inserted = self
            .with_store(move |store| match store.find_by_original(&original)? {
                Some(existing) => Ok(Inserted::Existing(existing)),
                None => store.get_or_insert(&original, &code_for_id),
            })
            .await?;

        let record = inserted.record();
        if inserted.is_created() {
            log::info!("Shortened {} as {}", record.original_url, record.short_code);
        } else {
            log::debug!("{} already shortened as {}", record.original_url, record.short_code);
        }

        let record = inserted.into_record();
        Ok(ShortenResponse {
            short_url: self.short_url(&record.short_code),
            short_code: record.short_code,
            original_url: record.original_url,
        })
    }

    /// Resolve a short code to its original URL and count the click
    pub async fn resolve(&self, code: &str) -> Result<String, ShortenError> {
        if !validate_code(code) {
            return Err(ShortenError::InvalidCode(code.to_string()));
        }

        let key = code.to_string();
        let original = if let Some(url) = self.lru.get(&key) {
            self.stats.record_hit();
            url
        } else if let Some(url) = self.ttl_get(code).await {
            self.stats.record_hit();
            self.lru.put(key, url.clone());
            url
        } else {
            self.stats.record_miss();
            let record = self
                .find_record(code)
                .await?
                .ok_or_else(|| ShortenError::NotFound(code.to_string()))?;
            self.lru.put(key, record.original_url.clone());
            self.ttl_set(code, &record.original_url).await;
            record.original_url
        };

        let clicked = code.to_string();
        if self.with_store(move |store| store.increment_clicks(&clicked)).await?.is_none() {
            log::warn!("Cached code {} has no stored record; click not counted", code);
        }

        Ok(original)
    }

    pub async fn stats(&self, code: &str) -> Result<UrlStats, ShortenError> {
        let record = self
            .find_record(code)
            .await?
            .ok_or_else(|| ShortenError::NotFound(code.to_string()))?;

        Ok(UrlStats {
            short_code: record.short_code,
            original_url: record.original_url,
            click_count: record.click_count,
            created_at: record.created_at.to_rfc3339(),
        })
    }

    pub fn cache_report(&self) -> CacheStatsResponse {
        CacheStatsResponse {
            report: self.stats.report(),
            size: self.lru.size(),
            capacity: self.lru.capacity(),
        }
    }

    pub fn reset_cache_stats(&self) -> CacheStatsResponse {
        self.stats.reset();
        log::info!("Cache statistics reset");
        self.cache_report()
    }

    async fn find_record(&self, code: &str) -> Result<Option<UrlRecord>, ShortenError> {
        let code = code.to_string();
        self.with_store(move |store| store.find_by_code(&code)).await
    }

    /// Run a store call on the blocking pool; the file backend writes and syncs inline
    async fn with_store<T, F>(&self, f: F) -> Result<T, ShortenError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn UrlStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
        Ok(result?)
    }

    fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    // TTL store failures degrade to a miss
    async fn ttl_get(&self, code: &str) -> Option<String> {
        match self.ttl_store.get(&ttl_key(code)).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("TTL store lookup for {} failed, treating as miss: {}", code, e);
                None
            }
        }
    }

    async fn ttl_set(&self, code: &str, original_url: &str) {
        if let Err(e) = self.ttl_store.set_with_ttl(&ttl_key(code), original_url, self.ttl).await {
            log::warn!("TTL store write for {} failed: {}", code, e);
        }
    }
}

fn ttl_key(code: &str) -> String {
    format!("{}{}", TTL_KEY_PREFIX, code)
}

/// Parse and normalise an absolute http(s) URL
fn normalize_url(raw: &str) -> Result<String, ShortenError> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ShortenError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ShortenError::InvalidUrl(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ShortenError::InvalidUrl("missing host".to_string()));
    }

    let normalized = parsed.to_string();
    if normalized.len() > MAX_URL_LEN {
        return Err(ShortenError::InvalidUrl(format!(
            "URL is {} characters, maximum is {}",
            normalized.len(),
            MAX_URL_LEN
        )));
    }
    Ok(normalized)
}
