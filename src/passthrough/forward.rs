//! Raw request forwarding.
//!
//! # Data Flow
//! ```text
//! request
//!     → prefix match (404 when nothing matches)
//!     → buffer body (413 when over the limit)
//!     → attempt loop: rebuild request, strip hop-by-hop headers, send
//!         → retryable status / network error and budget left → backoff, retry
//!     → upstream response (hop-by-hop stripped) or 502
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::passthrough::matcher::ServiceRoutes;
use crate::resilience::{calculate_backoff, is_retryable, RetryBudget};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Clone)]
pub struct ForwardState {
    pub routes: Arc<ServiceRoutes>,
    pub client: Client<HttpConnector, Body>,
    pub retries: RetryConfig,
    pub budget: Arc<RetryBudget>,
    pub upstream_timeout: Duration,
    pub max_body_size: usize,
}

pub async fn forward(State(state): State<ForwardState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let path = request.uri().path().to_string();

    let Some(route) = state.routes.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No service matched");
        return (StatusCode::NOT_FOUND, "No matching service").into_response();
    };
    let Some(target) = route.target(request.uri()) else {
        return (StatusCode::BAD_REQUEST, "Invalid request target").into_response();
    };
    let service = route.service;

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    let method = parts.method;
    let max_attempts = if state.retries.enabled {
        state.retries.max_attempts.max(1)
    } else {
        1
    };
    state.budget.record_request();

    tracing::debug!(request_id = %request_id, service, method = %method, path = %path, "Forwarding request");

    let mut attempt = 0;
    loop {
        attempt += 1;
        let start = Instant::now();

        let mut upstream = Request::new(Body::from(Bytes::clone(&body)));
        *upstream.method_mut() = method.clone();
        *upstream.uri_mut() = target.clone();
        *upstream.headers_mut() = headers.clone();

        let outcome = tokio::time::timeout(state.upstream_timeout, state.client.request(upstream)).await;

        let (status, error) = match &outcome {
            Ok(Ok(resp)) => (Some(resp.status()), None),
            Ok(Err(e)) => (None, Some(e.to_string())),
            Err(_) => (None, Some("upstream timed out".to_string())),
        };

        let can_retry = attempt < max_attempts
            && is_retryable(&method, status, error.is_some())
            && state.budget.can_retry();

        if can_retry {
            let delay = calculate_backoff(attempt, &state.retries);
            tracing::info!(
                request_id = %request_id,
                service,
                attempt,
                delay = ?delay,
                status = ?status,
                error = ?error,
                "Retrying request"
            );
            metrics::record_retry(service);
            tokio::time::sleep(delay).await;
            continue;
        }

        return match outcome {
            Ok(Ok(resp)) => {
                let label = if resp.status().is_success() { "success" } else { "status" };
                metrics::record_upstream(service, label, start);

                let (mut parts, body): (_, Incoming) = resp.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            _ => {
                metrics::record_upstream(service, "error", start);
                tracing::error!(
                    request_id = %request_id,
                    service,
                    attempt,
                    error = error.as_deref().unwrap_or("unknown"),
                    "Upstream request failed"
                );
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        };
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}
