//! Public API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, timeout, limits, CORS)
//!     → extract.rs (UUID path params, pagination, sorting, tokens)
//!     → handlers/* (one module per resource)
//!     → providers (fan-out to microservices)
//!     → public representation or ApiError
//! ```

pub mod extract;
pub mod handlers;
pub mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
