//! Application assembly
//!
//! [`ShortlinkServer`] turns a [`ShortlinkConfig`] into a running service:
//! it picks the storage and TTL backends, builds the [`Shortener`], binds the
//! listener and serves until Ctrl-C.

use crate::cache::{CacheStats, MemoryTtlStore, NullTtlStore, TtlStore};
use crate::config::{ShortlinkConfig, StorageBackend};
use crate::http::HttpServer;
use crate::service::{Shortener, ShortenerSettings};
use crate::store::{FileUrlStore, MemoryUrlStore, UrlStore};
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ShortlinkServer {
    config: ShortlinkConfig,
}

impl ShortlinkServer {
    pub fn new(config: ShortlinkConfig) -> Self {
        Self { config }
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        self.config.validate()?;
        let addr = self.config.server.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve_on(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.config.validate()?;
        let shortener = Arc::new(build_shortener(&self.config)?);
        self.log_summary(&shortener);

        HttpServer::new(shortener, &self.config.server)
            .serve_with_shutdown(listener, shutdown)
            .await
            .context("HTTP server failed")?;

        log::info!("👋 Shortlink stopped");
        Ok(())
    }

    fn log_summary(&self, shortener: &Shortener) {
        let cfg = &self.config;
        log::info!("🚀 Starting Shortlink v{}", env!("CARGO_PKG_VERSION"));
        log::info!("   Base URL: {}", shortener.base_url());
        log::info!("   LRU capacity: {}", cfg.cache.capacity);
        if cfg.cache.ttl_enabled {
            log::info!("   TTL store: memory ({}s)", cfg.cache.ttl_seconds);
        } else {
            log::info!("   TTL store: disabled");
        }
        match cfg.storage.backend {
            StorageBackend::Memory => log::info!("   Storage: memory"),
            StorageBackend::File => log::info!(
                "   Storage: file ({}, fsync {})",
                cfg.storage.data_dir,
                if cfg.storage.fsync { "on" } else { "off" }
            ),
        }
    }
}

/// Build a [`Shortener`] wired to the backends `config` selects
pub fn build_shortener(config: &ShortlinkConfig) -> Result<Shortener> {
    let store: Arc<dyn UrlStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryUrlStore::new()),
        StorageBackend::File => Arc::new(
            FileUrlStore::open(&config.storage.data_dir, config.storage.fsync).with_context(|| {
                format!("Failed to open URL store in {}", config.storage.data_dir)
            })?,
        ),
    };

    let ttl_store: Arc<dyn TtlStore> = if config.cache.ttl_enabled {
        Arc::new(MemoryTtlStore::new())
    } else {
        Arc::new(NullTtlStore)
    };

    let settings = ShortenerSettings {
        cache_capacity: config.cache.capacity,
        ttl: config.cache.ttl(),
        base_url: config.server.public_base_url(),
    };

    Ok(Shortener::new(store, ttl_store, Arc::new(CacheStats::new()), settings)?)
}
