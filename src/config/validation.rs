//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, upstream URLs and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{CacheBackendKind, GatewayConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid bind address '{value}'")]
    BindAddress { field: &'static str, value: String },

    #[error("upstreams.{service}: invalid URL '{value}'")]
    UpstreamUrl { service: &'static str, value: String },

    #[error("auth.secret_key must not be empty")]
    MissingSecret,

    #[error("cache.redis_host must be set when the redis backend is selected")]
    MissingRedisHost,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("public.scheme must be 'http' or 'https', got '{0}'")]
    Scheme(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_bind(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.services_api.enabled {
        check_bind(&mut errors, "services_api.bind_address", &config.services_api.bind_address);
    }
    if config.observability.metrics_enabled {
        check_bind(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    for (service, value) in config.upstreams.all() {
        let valid = Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::UpstreamUrl {
                service,
                value: value.to_string(),
            });
        }
    }

    if config.auth.secret_key.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }

    if config.cache.backend == CacheBackendKind::Redis && config.cache.redis_host.is_empty() {
        errors.push(ValidationError::MissingRedisHost);
    }

    if !matches!(config.public.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::Scheme(config.public.scheme.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero("retries.max_attempts"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bind(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress {
            field,
            value: value.to_string(),
        });
    }
}
