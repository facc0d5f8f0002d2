//! Retry logic.
//!
//! # Responsibilities
//! - Determine if request is retryable (idempotent methods only)
//! - Enforce retry budget (retries as a share of requests)
//!
//! # Design Decisions
//! - Never retry POST/PUT/DELETE/PATCH (non-idempotent)
//! - Connection errors always retryable; only gateway-class 5xx are

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::{Method, StatusCode};

/// Whether a failed attempt may be repeated.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, network_error: bool) -> bool {
    if !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return false;
    }
    if network_error {
        return true;
    }
    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}

/// Caps retries to a ratio of observed requests.
///
/// `min_retries` retries are always allowed so a quiet gateway can still recover from a
/// single blip.
#[derive(Debug)]
pub struct RetryBudget {
    ratio: f32,
    min_retries: usize,
    requests: AtomicUsize,
    retries: AtomicUsize,
}

impl RetryBudget {
    pub fn new(ratio: f32, min_retries: usize) -> Self {
        Self {
            ratio: ratio.max(0.0),
            min_retries,
            requests: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Try to spend one retry. Returns false when the budget is exhausted.
    pub fn can_retry(&self) -> bool {
        let requests = self.requests.load(Ordering::Relaxed);
        let allowed = self.min_retries + (requests as f64 * self.ratio as f64) as usize;
        self.retries
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |spent| {
                (spent < allowed).then_some(spent + 1)
            })
            .is_ok()
    }
}
