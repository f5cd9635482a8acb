//! Server configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server listening port
    /// Env: SL_PORT
    /// Default: 8000
    pub port: u16,

    /// Server listening address
    /// Env: SL_HOST
    /// Default: "127.0.0.1"
    pub host: String,

    /// Public prefix for generated short URLs
    /// Env: SL_BASE_URL
    /// Default: None (derived as http://{host}:{port})
    pub base_url: Option<String>,

    /// Number of Tokio worker threads
    /// Env: SL_WORKERS
    /// Default: None (Tokio picks one per core)
    pub workers: Option<usize>,

    /// Request timeout in seconds
    /// Env: SL_REQUEST_TIMEOUT
    /// Default: 30
    pub request_timeout: u64,

    /// Maximum request body size in bytes
    /// Env: SL_MAX_BODY_SIZE
    /// Default: 65536 (64KB)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            base_url: None,
            workers: None,
            request_timeout: 30,
            max_body_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.port = other.port;
        self.host = other.host;
        self.base_url = other.base_url;
        self.workers = other.workers;
        self.request_timeout = other.request_timeout;
        self.max_body_size = other.max_body_size;
    }

    /// Apply environment variables
    pub fn apply_env_vars(&mut self) {
        if let Ok(port) = env::var("SL_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Ok(host) = env::var("SL_HOST") {
            self.host = host;
        }

        if let Ok(base_url) = env::var("SL_BASE_URL") {
            self.base_url = Some(base_url);
        }

        if let Ok(workers) = env::var("SL_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.workers = Some(w);
            }
        }

        if let Ok(timeout) = env::var("SL_REQUEST_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.request_timeout = t;
            }
        }

        if let Ok(size) = env::var("SL_MAX_BODY_SIZE") {
            if let Ok(s) = size.parse() {
                self.max_body_size = s;
            }
        }
    }

    /// Address to bind, `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Prefix for short URLs, without a trailing slash
    pub fn public_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_addr()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Invalid port: port must be between 1 and 65535");
        }

        if self.host.is_empty() {
            bail!("Invalid host: host cannot be empty");
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                bail!("Invalid workers: must be at least 1");
            }
        }

        if self.request_timeout == 0 {
            bail!("Invalid request_timeout: must be greater than 0");
        }

        if self.max_body_size == 0 {
            bail!("Invalid max_body_size: must be greater than 0");
        }

        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => bail!("Invalid base_url: {} is not an absolute http(s) URL", base_url),
            }
        }

        Ok(())
    }
}
