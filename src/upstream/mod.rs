//! Upstream dependency subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker-guarded call
//!     → client.rs (GET /api/v1/{noun,adjective}, client timeout)
//!     → status >= 400 mapped to DependencyError::Http
//!     → JSON body → word extracted by kind
//! ```
//!
//! # Design Decisions
//! - One reqwest client shared by both dependency kinds
//! - No retries at this layer
//! - Error message for HTTP failures is "{status}: {reason}\n{body}"

pub mod client;
pub mod types;

pub use client::{DependencyClient, WordSource};
pub use types::{DependencyError, DependencyKind, DependencyResult};
