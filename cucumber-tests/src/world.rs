use cucumber::World as CucumberWorld;
use serde_json::Value;
use shortlink_core::cache::LruCache;
use shortlink_core::config::ShortlinkConfig;
use shortlink_core::ShortlinkServer;
use std::collections::HashMap;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A shortener running on an ephemeral port for the length of a scenario
#[derive(Debug)]
pub struct RunningServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    /// Shut the server down and wait for its task to finish
    pub async fn stop(mut self) -> anyhow::Result<()> {
        self.signal_shutdown();
        (&mut self.handle).await?
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Scenarios end by dropping their world, which stops the server
impl Drop for RunningServer {
    fn drop(&mut self) {
        self.signal_shutdown();
    }
}

/// Last HTTP exchange seen by a scenario
#[derive(Debug, Clone, Default)]
pub struct LastResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: Value,
}

#[derive(Debug, Default, CucumberWorld)]
pub struct ShortlinkWorld {
    /// Cache under test in the pure cache scenarios
    pub cache: Option<LruCache<String, String>>,
    pub cache_error: Option<String>,

    pub server: Option<RunningServer>,
    pub client: reqwest::Client,
    pub last_response: Option<LastResponse>,
    /// Original URL -> short code, as returned by /shorten
    pub codes: HashMap<String, String>,
}

impl ShortlinkWorld {
    pub fn cache_mut(&mut self) -> &mut LruCache<String, String> {
        self.cache.as_mut().expect("no cache created in this scenario")
    }

    /// Start a server with an in-memory store and no TTL layer
    pub async fn start_server(&mut self, capacity: usize) -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let mut config = ShortlinkConfig::default();
        config.cache.capacity = capacity;
        config.cache.ttl_enabled = false;
        config.server.base_url = Some(base_url.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            ShortlinkServer::new(config)
                .serve_on(listener, async {
                    let _ = rx.await;
                })
                .await
        });

        self.client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        self.server = Some(RunningServer {
            base_url,
            shutdown: Some(tx),
            handle,
        });
        Ok(())
    }

    pub fn url(&self, path: &str) -> String {
        let server = self.server.as_ref().expect("no server started in this scenario");
        format!("{}{}", server.base_url, path)
    }

    /// Send a request and remember the response
    pub async fn request(
        &mut self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<()> {
        let url = self.url(path);
        let builder = match method {
            "GET" => self.client.get(&url),
            "POST" => self.client.post(&url),
            "PUT" => self.client.put(&url),
            "DELETE" => self.client.delete(&url),
            other => anyhow::bail!("unsupported method {}", other),
        };
        let builder = match body {
            Some(json) => builder.json(&json),
            None => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        self.last_response = Some(LastResponse {
            status,
            location,
            body,
        });
        Ok(())
    }

    pub fn last(&self) -> &LastResponse {
        self.last_response.as_ref().expect("no request sent in this scenario")
    }

    pub async fn shorten(&mut self, original_url: &str) -> anyhow::Result<String> {
        self.request("POST", "/shorten", Some(serde_json::json!({ "original_url": original_url })))
            .await?;
        let code = self.last().body["short_code"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("no short_code in {:?}", self.last().body))?
            .to_string();
        self.codes.insert(original_url.to_string(), code.clone());
        Ok(code)
    }

    pub fn code_for(&self, original_url: &str) -> String {
        self.codes
            .get(original_url)
            .cloned()
            .unwrap_or_else(|| panic!("{} was never shortened", original_url))
    }
}
