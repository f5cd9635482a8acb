//! Shortlink - URL shortener core
//!
//! A URL shortener whose redirect path is served out of a bounded
//! least-recently-used cache in front of durable storage.
//!
//! # Overview
//!
//! - [`cache`] - the LRU cache, its thread-safe wrapper, hit/miss statistics
//!   and the TTL store seam
//! - [`codec`] - Base62 short codes
//! - [`store`] - URL records in memory or in an append-only event log
//! - [`service`] - the [`Shortener`](service::Shortener) tying them together
//! - [`http`] - hyper routes and accept loop
//! - [`config`] - defaults, `shortlink.toml`, `SL_*` environment variables
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shortlink_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ShortlinkConfig::load()?;
//!     init_logging(&config.logging);
//!     ShortlinkServer::new(config).serve().await
//! }
//! ```

pub mod app;
pub mod cache;
pub mod codec;
pub mod config;
pub mod http;
pub mod logging;
pub mod prelude;
pub mod service;
pub mod store;

pub use app::{build_shortener, ShortlinkServer};
pub use config::ShortlinkConfig;
