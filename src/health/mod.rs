//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! check()
//!     → reporter.rs reads noun + adjective breaker states
//!     → HealthRule → HealthStatus { noun, adj, status }
//! ```
//!
//! # Design Decisions
//! - Off the hot path: no locks held beyond a state read, no I/O
//! - Health state is per-breaker; breakers never influence each other

pub mod reporter;

pub use reporter::{HealthReporter, HealthStatus, Status};
