//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Idempotent call to a microservice:
//!     → reqwest timeout (per call deadline)
//!     → On failure: retries.rs (check if retryable, consult retry budget)
//!     → backoff.rs (sleep with jittered exponential delay, then try again)
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - Retries only for idempotent requests (GET, HEAD, etc.)
//! - Retry budget bounds the extra load retries put on a struggling service

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::{is_retryable, RetryBudget};
