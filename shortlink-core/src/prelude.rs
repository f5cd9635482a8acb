//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use shortlink_core::prelude::*;
//! ```

// === Server ===
pub use crate::app::{build_shortener, ShortlinkServer};
pub use crate::http::HttpServer;

// === Configuration ===
pub use crate::config::{ShortlinkConfig, StorageBackend};
pub use crate::logging::init_logging;

// === Cache ===
pub use crate::cache::{Cache, CacheReport, CacheStats, LruCache, SharedLruCache, TtlStore};

// === Service ===
pub use crate::codec::{decode_base62, encode_base62};
pub use crate::service::{ShortenError, Shortener, ShortenerSettings};
pub use crate::store::{FileUrlStore, MemoryUrlStore, UrlRecord, UrlStore};
