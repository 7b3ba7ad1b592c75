//! Request forwarding to the backend.
//!
//! Requests under the configured prefix are replayed against the target with
//! the same method, path, query and body. Hop-by-hop headers are dropped in
//! both directions and the upstream connection is always asked to stay alive.
//! Response bodies are streamed through unbuffered, so chat streams reach the
//! browser chunk by chunk.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use talk_core::cookies::{self, CookieSweep};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::AppState;

/// Failure to get a response out of the backend
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request body rejected: {0}")]
    RequestBody(axum::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::RequestBody(_) => StatusCode::PAYLOAD_TOO_LARGE,
            // The browser sees the failure as an empty response
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Body::empty()).into_response()
    }
}

/// Forward one request to the backend
pub async fn forward(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match send_upstream(&state, request).await {
        Ok(response) => {
            state.stats.record_forwarded();
            debug!("{} {} -> {}", method, path, response.status());
            response
        }
        Err(e) => {
            state.stats.record_failed();
            warn!("proxy error: {} {}: {}", method, path, e);
            e.into_response()
        }
    }
}

async fn send_upstream(state: &AppState, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = state.upstream_url(path_and_query);

    // API request bodies are small JSON documents; only responses stream
    let body = axum::body::to_bytes(body, state.config.max_body_length)
        .await
        .map_err(ProxyError::RequestBody)?;

    let mut headers = request_headers(&parts.headers, state.config.change_origin);
    let sweep = sweep_request_cookies(&mut headers);

    let mut upstream = state.http.request(parts.method, url).headers(headers);
    if !body.is_empty() {
        upstream = upstream.body(body);
    }
    let upstream = upstream.send().await?;

    let status = upstream.status();
    let mut headers = response_headers(upstream.headers());
    for directive in sweep.expiry_directives() {
        if let Ok(value) = HeaderValue::from_str(&directive) {
            headers.append(header::SET_COOKIE, value);
        }
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

// ─────────────────────────────────────────────────────────────────────────────
// Header rewriting
// ─────────────────────────────────────────────────────────────────────────────

/// Headers that describe a single connection and are never forwarded
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copy end-to-end headers, also dropping any listed in `Connection`
fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || listed.iter().any(|l| l == name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Headers sent to the backend
fn request_headers(incoming: &HeaderMap, change_origin: bool) -> HeaderMap {
    let mut headers = end_to_end(incoming);
    if change_origin {
        // The client fills in the target's authority
        headers.remove(header::HOST);
    }
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

/// Headers returned to the browser
fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    end_to_end(upstream)
}

/// Drop sweepable cookies from the forwarded `Cookie` header
fn sweep_request_cookies(headers: &mut HeaderMap) -> CookieSweep {
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    let sweep = cookies::sweep(&joined);
    if sweep.is_clean() {
        return sweep;
    }

    debug!("Dropping cookies: {}", sweep.expired.join(", "));
    headers.remove(header::COOKIE);
    if let Some(value) = sweep.header_value().and_then(|v| HeaderValue::from_str(&v).ok()) {
        headers.insert(header::COOKIE, value);
    }
    sweep
}
