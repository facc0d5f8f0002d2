//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: '{value}'")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Override file values with deployment environment variables.
///
/// `lookup` abstracts `std::env::var` so overrides can be exercised without touching the
/// process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(domain) = lookup("PUBLIC_DOMAIN") {
        config.public.domain = domain;
    }
    if let Some(scheme) = lookup("PUBLIC_SCHEME") {
        config.public.scheme = scheme;
    }
    if let Some(secret) = lookup("SECRET_KEY") {
        config.auth.secret_key = secret;
    }
    if let Some(host) = lookup("REDIS_HOST") {
        config.cache.redis_host = host;
    }
    if let Some(port) = lookup("REDIS_PORT") {
        config.cache.redis_port = port.parse().map_err(|_| ConfigError::Env {
            name: "REDIS_PORT",
            value: port.clone(),
        })?;
    }
    if let Some(password) = lookup("REDIS_SECRET") {
        config.cache.redis_password = Some(password);
    }
    if let Some(url) = lookup("MOVIES_URL") {
        config.upstreams.movies_url = url;
    }
    if let Some(url) = lookup("REVIEWS_URL") {
        config.upstreams.reviews_url = url;
    }
    if let Some(url) = lookup("USERS_URL") {
        config.upstreams.users_url = url;
    }
    if let Some(url) = lookup("RELATIONSHIPS_URL") {
        config.upstreams.relationships_url = url;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format = match format.as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => {
                return Err(ConfigError::Env {
                    name: "LOG_FORMAT",
                    value: format,
                })
            }
        };
    }
    Ok(())
}
