//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a dependency:
//!     → circuit_breaker.rs (admit: closed / open / half-open trial)
//!     → timeouts.rs (each attempt bounded by the breaker deadline)
//!     → retried up to max_retries, then counted as one failure
//!     → fallback value substituted when the call fails or is short-circuited
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Circuit breaker prevents hammering a dependency that is down
//! - Failures are absorbed at this boundary when fallback is enabled

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{
    BreakerConfig, CallFailure, CircuitBreaker, CircuitState, Outcome, FAILURE_MARKER, OPEN_MARKER,
};
