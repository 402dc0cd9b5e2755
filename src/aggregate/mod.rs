//! Aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! get_composite()
//!     → aggregator.rs (spawn noun + adjective + adjective, all before awaiting)
//!     → each call guarded by its kind's circuit breaker
//!     → results collected in completion order
//!     → composer.rs (partition by tag → CompositeResult)
//! ```
//!
//! # Design Decisions
//! - Every call settles; fallback markers stand in for failed words
//! - Only an unrecovered failure or a contract violation aborts the request
//! - adj1/adj2 are an unordered pair

pub mod aggregator;
pub mod composer;
pub mod types;

pub use aggregator::Aggregator;
pub use composer::compose;
pub use types::{AggregateError, CompositeResult, Fragment};
