//! Calls to the downstream microservices.
//!
//! # Data Flow
//! ```text
//! provider
//!     → ServiceClient (URL, query, JSON/form body)
//!     → reqwest (timeouts, connection pooling)
//!     → retry loop for idempotent calls
//!     → decoded body or UpstreamError { status + body | transport | decode }
//! ```

pub mod client;

pub use client::{ServiceClient, UpstreamError};

use std::time::Duration;

use crate::config::TimeoutConfig;

/// Shared HTTP client for every microservice.
pub fn build_http_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .no_proxy()
        .build()
}
