//! Request routing
//!
//! | Method | Path                 | Handler                    |
//! |--------|----------------------|----------------------------|
//! | GET    | `/`                  | service banner             |
//! | GET    | `/health`            | liveness                   |
//! | POST   | `/shorten`           | create or reuse short code |
//! | GET    | `/stats/{code}`      | click statistics           |
//! | GET    | `/cache/stats`       | cache hit/miss report      |
//! | POST   | `/cache/stats/reset` | reset hit/miss counters    |
//! | GET    | `/{code}`            | 302 redirect               |

use super::{
    body_from, finish, json_error_response, json_response, method_not_allowed_response,
    not_found_response, Resp,
};
use crate::service::{ShortenError, ShortenRequest, Shortener};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{CONTENT_LENGTH, LOCATION};
use hyper::{Method, Request, Response, StatusCode};

/// Dispatch one request
pub async fn route<B>(shortener: &Shortener, req: Request<B>, max_body_size: usize) -> Resp
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, [""]) => home(),
        (&Method::GET, ["health"]) => {
            json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
        }
        (&Method::POST, ["shorten"]) => shorten(shortener, req, max_body_size).await,
        (_, ["shorten"]) => method_not_allowed_response("POST"),
        (&Method::GET, ["cache", "stats"]) => {
            json_response(StatusCode::OK, &shortener.cache_report())
        }
        (_, ["cache", "stats"]) => method_not_allowed_response("GET"),
        (&Method::POST, ["cache", "stats", "reset"]) => {
            json_response(StatusCode::OK, &shortener.reset_cache_stats())
        }
        (_, ["cache", "stats", "reset"]) => method_not_allowed_response("POST"),
        (&Method::GET, ["stats", code]) => match shortener.stats(code).await {
            Ok(stats) => json_response(StatusCode::OK, &stats),
            Err(e) => error_response(&e),
        },
        (_, ["stats", _]) => method_not_allowed_response("GET"),
        (&Method::GET, [code]) if !code.is_empty() => redirect(shortener, code).await,
        (_, [code]) if !code.is_empty() => method_not_allowed_response("GET"),
        _ => not_found_response(&path),
    }
}

fn home() -> Resp {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "message": "URL Shortener API",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn shorten<B>(shortener: &Shortener, req: Request<B>, max_body_size: usize) -> Resp
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = match read_body(req, max_body_size).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let payload: ShortenRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return json_error_response(StatusCode::BAD_REQUEST, "invalid_json", &e.to_string())
        }
    };

    match shortener.shorten(&payload.original_url).await {
        Ok(created) => json_response(StatusCode::CREATED, &created),
        Err(e) => error_response(&e),
    }
}

async fn redirect(shortener: &Shortener, code: &str) -> Resp {
    match shortener.resolve(code).await {
        Ok(url) => finish(
            Response::builder().status(StatusCode::FOUND).header(LOCATION, url),
            body_from(""),
        ),
        Err(e) => error_response(&e),
    }
}

/// Collect the request body, refusing anything above `limit` bytes
async fn read_body<B>(req: Request<B>, limit: usize) -> Result<Bytes, Resp>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(payload_too_large(limit));
    }

    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(payload_too_large(limit)),
        Err(e) => {
            log::warn!("Failed to read request body: {}", e);
            Err(json_error_response(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                "failed to read request body",
            ))
        }
    }
}

fn payload_too_large(limit: usize) -> Resp {
    json_error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "payload_too_large",
        &format!("request body exceeds {} bytes", limit),
    )
}

fn error_response(err: &ShortenError) -> Resp {
    match err {
        ShortenError::Storage(e) => {
            log::error!("Storage failure: {}", e);
            json_error_response(err.status(), err.code(), "internal storage error")
        }
        _ => json_error_response(err.status(), err.code(), &err.to_string()),
    }
}
