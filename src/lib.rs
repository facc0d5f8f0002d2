//! Movie reviews API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                      GATEWAY                          │
//!                         │                                                       │
//!   Browser / app         │  ┌──────────┐   ┌──────────┐   ┌─────────────┐        │
//!   ──────────────────────┼─▶│   http   │──▶│ handlers │──▶│  providers  │──┐     │
//!   :8080 /v1/...         │  │  server  │   │ + auth   │   │  (fan-out)  │  │     │
//!                         │  └──────────┘   └──────────┘   └──────┬──────┘  │     │
//!                         │                                       │         │     │
//!                         │                                ┌──────▼─────┐   │     │
//!                         │                                │   cache    │   │     │
//!                         │                                │  (redis)   │   │     │
//!                         │                                └────────────┘   │     │
//!                         │                                                 ▼     │
//!   Backend callers       │  ┌──────────────┐                       ┌──────────┐  │     movies
//!   ──────────────────────┼─▶│ passthrough  │──────────────────────▶│ upstream │──┼──▶  reviews
//!   :8081 /api/...        │  │ services API │                       │ clients  │  │     users
//!                         │  └──────────────┘                       └──────────┘  │     relationships
//!                         │                                                       │
//!                         │  config · error · resilience · observability · lifecycle
//!                         └──────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod passthrough;
pub mod providers;
pub mod upstream;

// Domain
pub mod auth;
pub mod cache;
pub mod error;
pub mod models;
pub mod paging;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use passthrough::ServicesApiServer;
