//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (PUBLIC_DOMAIN, SECRET_KEY, REDIS_*, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, CacheBackendKind, CacheConfig, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PublicConfig, RetryConfig, SecurityConfig, ServicesApiConfig,
    TimeoutConfig, UpstreamConfig,
};
