//! End-to-end tests against a live server on an ephemeral port

use shortlink_core::config::ShortlinkConfig;
use shortlink_core::ShortlinkServer;
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start(mut config: ShortlinkConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        config.server.base_url = Some(format!("http://{}", addr));

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            ShortlinkServer::new(config)
                .serve_on(listener, async {
                    let _ = rx.await;
                })
                .await
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            addr,
            client,
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn shorten(&self, original_url: &str) -> reqwest::Response {
        self.client
            .post(self.url("/shorten"))
            .json(&serde_json::json!({ "original_url": original_url }))
            .send()
            .await
            .unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_home_and_health() {
    let server = TestServer::start(ShortlinkConfig::default()).await;

    let resp = server.client.get(server.url("/")).send().await.unwrap();
    let home: Value = resp.json().await.unwrap();
    assert_eq!(home["message"], "URL Shortener API");
    assert!(home["version"].is_string());

    let health = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), 200);

    server.stop().await;
}

#[tokio::test]
async fn test_shorten_redirect_and_stats() {
    let server = TestServer::start(ShortlinkConfig::default()).await;

    let resp = server.shorten("https://example.com/article").await;
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let code = created["short_code"].as_str().unwrap().to_string();
    assert_eq!(created["short_url"], server.url(&format!("/{}", code)));

    // Shortening again hands back the same code
    let again: Value = server.shorten("https://example.com/article").await.json().await.unwrap();
    assert_eq!(again["short_code"], code.as_str());

    for _ in 0..3 {
        let resp = server.client.get(server.url(&format!("/{}", code))).send().await.unwrap();
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers()["location"], "https://example.com/article");
    }

    let stats: Value = server
        .client
        .get(server.url(&format!("/stats/{}", code)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["click_count"], 3);
    assert_eq!(stats["original_url"], "https://example.com/article");

    let cache: Value =
        server.client.get(server.url("/cache/stats")).send().await.unwrap().json().await.unwrap();
    assert_eq!(cache["hits"], 2);
    assert_eq!(cache["misses"], 1);
    assert_eq!(cache["total"], 3);
    assert_eq!(cache["hit_rate"], "66.67%");

    let reset: Value = server
        .client
        .post(server.url("/cache/stats/reset"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset["total"], 0);
    assert_eq!(reset["hit_rate"], "0.00%");

    server.stop().await;
}

#[tokio::test]
async fn test_error_responses() {
    let mut config = ShortlinkConfig::default();
    config.server.max_body_size = 256;
    let server = TestServer::start(config).await;

    let resp = server.shorten("javascript:alert(1)").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_url");

    let resp = server.shorten(&format!("https://example.com/{}", "x".repeat(512))).await;
    assert_eq!(resp.status(), 413);

    let resp = server.client.get(server.url("/not-a-code")).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    let resp = server.client.get(server.url("/zzzz")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let resp = server.client.put(server.url("/shorten")).send().await.unwrap();
    assert_eq!(resp.status(), 405);
    assert_eq!(resp.headers()["allow"], "POST");

    server.stop().await;
}

#[tokio::test]
async fn test_lru_eviction_visible_in_stats() {
    let mut config = ShortlinkConfig::default();
    config.cache.capacity = 2;
    config.cache.ttl_enabled = false;
    let server = TestServer::start(config).await;

    let mut codes = Vec::new();
    for path in ["a", "b", "c"] {
        let body: Value =
            server.shorten(&format!("https://example.com/{}", path)).await.json().await.unwrap();
        codes.push(body["short_code"].as_str().unwrap().to_string());
    }

    // a, b, a, c (evicts b), b (miss again)
    for i in [0, 1, 0, 2, 1] {
        let resp = server.client.get(server.url(&format!("/{}", codes[i]))).send().await.unwrap();
        assert_eq!(resp.status(), 302);
    }

    let cache: Value =
        server.client.get(server.url("/cache/stats")).send().await.unwrap().json().await.unwrap();
    assert_eq!(cache["hits"], 1);
    assert_eq!(cache["misses"], 4);
    assert_eq!(cache["size"], 2);
    assert_eq!(cache["capacity"], 2);

    server.stop().await;
}
