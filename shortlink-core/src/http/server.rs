//! Hyper accept loop

use super::{handlers, json_error_response, log_access, Resp};
use crate::config::ServerConfig;
use crate::service::Shortener;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

/// How long open connections get to finish once shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// HTTP/1 server exposing a [`Shortener`]
pub struct HttpServer {
    shortener: Arc<Shortener>,
    request_timeout: Duration,
    max_body_size: usize,
}

impl HttpServer {
    pub fn new(shortener: Arc<Shortener>, config: &ServerConfig) -> Self {
        Self {
            shortener,
            request_timeout: Duration::from_secs(config.request_timeout),
            max_body_size: config.max_body_size,
        }
    }

    /// Serve until `shutdown` resolves, then drain open connections
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        log::info!("Listening on http://{}", local_addr);

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            log::warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    self.spawn_connection(&graceful, stream, remote);
                }
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        tokio::select! {
            _ = graceful.shutdown() => log::info!("All connections closed"),
            _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
                log::warn!("Connections still open after {:?}, closing anyway", SHUTDOWN_GRACE);
            }
        }
        Ok(())
    }

    fn spawn_connection(
        &self,
        graceful: &GracefulShutdown,
        stream: tokio::net::TcpStream,
        remote: SocketAddr,
    ) {
        let shortener = self.shortener.clone();
        let request_timeout = self.request_timeout;
        let max_body_size = self.max_body_size;

        let service = service_fn(move |req: super::Req| {
            let shortener = shortener.clone();
            async move {
                let start = Instant::now();
                let method = req.method().to_string();
                let path = req.uri().path().to_string();

                let resp = match tokio::time::timeout(
                    request_timeout,
                    handlers::route(&shortener, req, max_body_size),
                )
                .await
                {
                    Ok(resp) => resp,
                    Err(_) => timed_out(request_timeout),
                };

                log_access(Some(remote), &method, &path, &resp, start);
                Ok::<_, Infallible>(resp)
            }
        });

        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        let conn = graceful.watch(conn);
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                log::debug!("Connection from {} ended with error: {}", remote, e);
            }
        });
    }
}

fn timed_out(limit: Duration) -> Resp {
    json_error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "request_timeout",
        &format!("request did not complete within {}s", limit.as_secs()),
    )
}
