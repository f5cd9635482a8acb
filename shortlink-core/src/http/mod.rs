//! HTTP surface built on hyper
//!
//! - [`server`] - connection accept loop and graceful shutdown
//! - [`handlers`] - request routing onto the [`Shortener`](crate::service::Shortener)
//!
//! Every error leaves as `{"error":"snake_code","message":"..."}`.

pub mod handlers;
pub mod server;

pub use handlers::route;
pub use server::HttpServer;

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;

/// Common HTTP type aliases
pub type RespBody = BoxBody<Bytes, Infallible>;
pub type Req = Request<hyper::body::Incoming>;
pub type Resp = Response<RespBody>;

/// Create a response body from any data that can be converted to Bytes
pub fn body_from<T: Into<Bytes>>(data: T) -> RespBody {
    Full::new(data.into()).boxed()
}

/// Finish a response builder, degrading to a bare 500 if a header was invalid
pub fn finish(builder: ::http::response::Builder, body: RespBody) -> Resp {
    builder.body(body).unwrap_or_else(|e| {
        log::error!("Failed to build response: {}", e);
        let mut resp = Response::new(body_from(""));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    })
}

/// Serialize `value` as a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Resp {
    match serde_json::to_vec(value) {
        Ok(body) => finish(
            Response::builder().status(status).header("Content-Type", "application/json"),
            body_from(body),
        ),
        Err(e) => {
            log::error!("Failed to serialize response: {}", e);
            internal_server_error_response("failed to serialize response")
        }
    }
}

/// Create a JSON error response with given status code
pub fn json_error_response(status: StatusCode, error: &str, message: &str) -> Resp {
    let body = serde_json::json!({ "error": error, "message": message }).to_string();
    finish(
        Response::builder().status(status).header("Content-Type", "application/json"),
        body_from(body),
    )
}

/// Create a standard 404 Not Found JSON response
pub fn not_found_response(resource: &str) -> Resp {
    json_error_response(StatusCode::NOT_FOUND, "not_found", &format!("{} not found", resource))
}

/// 405 Method Not Allowed with Allow header
pub fn method_not_allowed_response(allowed: &str) -> Resp {
    let body = serde_json::json!({
        "error": "method_not_allowed",
        "message": format!("allowed: {}", allowed),
    })
    .to_string();
    finish(
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("Content-Type", "application/json")
            .header("Allow", allowed),
        body_from(body),
    )
}

pub fn internal_server_error_response(message: &str) -> Resp {
    json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
}

/// Log an HTTP access entry as a JSON line
pub fn log_access(
    remote: Option<std::net::SocketAddr>,
    method: &str,
    path: &str,
    resp: &Resp,
    start: std::time::Instant,
) {
    let remote_ip = remote.map(|r| r.ip().to_string()).unwrap_or_else(|| "-".into());
    log::info!(
        "{}",
        serde_json::json!({
            "remote": remote_ip,
            "method": method,
            "path": path,
            "status": resp.status().as_u16(),
            "dur_ms": start.elapsed().as_millis() as u64,
        })
    );
}
