//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::{Deserialize, Serialize};

/// Root configuration for the movie gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Public API listener.
    pub listener: ListenerConfig,

    /// Backend-facing services API listener.
    pub services_api: ServicesApiConfig,

    /// Base URLs of the downstream microservices.
    pub upstreams: UpstreamConfig,

    /// Public domain used for CORS and cookies.
    pub public: PublicConfig,

    /// Token verification and cookie settings.
    pub auth: AuthConfig,

    /// Movie cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for idempotent upstream calls.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Services API (raw forwarding) listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesApiConfig {
    pub enabled: bool,
    pub bind_address: String,
}

impl Default for ServicesApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Downstream microservice base URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub movies_url: String,
    pub reviews_url: String,
    pub users_url: String,
    pub relationships_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            movies_url: "http://movies:80".to_string(),
            reviews_url: "http://reviews:80".to_string(),
            users_url: "http://users:80".to_string(),
            relationships_url: "http://relationships:80".to_string(),
        }
    }
}

impl UpstreamConfig {
    /// All upstreams as `(service name, base url)` pairs.
    pub fn all(&self) -> [(&'static str, &str); 4] {
        [
            ("movies", self.movies_url.as_str()),
            ("reviews", self.reviews_url.as_str()),
            ("users", self.users_url.as_str()),
            ("relationships", self.relationships_url.as_str()),
        ]
    }
}

/// Public-facing address of the web application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublicConfig {
    /// Domain allowed by CORS (matched as a substring of the request origin).
    pub domain: String,

    /// "http" or "https". Cookies get the `Secure` flag on https.
    pub scheme: String,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            domain: "localhost".to_string(),
            scheme: "http".to_string(),
        }
    }
}

/// JWT settings. The secret is shared with the users service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret_key: String,

    /// Name of the cookie holding the token after log-in.
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            cookie_name: "token".to_string(),
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Redis,
    Memory,
    Disabled,
}

/// Movie cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,

    pub redis_host: String,
    pub redis_port: u16,
    pub redis_password: Option<String>,

    /// Entry lifetime in seconds; 0 keeps entries until evicted by Redis.
    pub ttl_secs: u64,

    /// Give up connecting after this many milliseconds and run uncached.
    pub connect_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Redis,
            redis_host: "redis".to_string(),
            redis_port: 6379,
            redis_password: None,
            ttl_secs: 0,
            connect_timeout_ms: 500,
        }
    }
}

impl CacheConfig {
    /// Redis connection details; the password is passed as-is, never through a URL.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.redis_host.clone(), self.redis_port),
            redis: RedisConnectionInfo {
                password: self.redis_password.clone().filter(|p| !p.is_empty()),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for upstream calls in seconds.
    pub connect_secs: u64,

    /// Single upstream call timeout in seconds.
    pub upstream_secs: u64,

    /// Whole client request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 10,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, the first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Share of requests that may be retries (0.1 = 10%).
    pub budget_ratio: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            budget_ratio: 0.1,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}
