//! Publish subsystem.
//!
//! # Data Flow
//! ```text
//! CompositeResult (already returned to the caller)
//!     → sink.rs (spawn one attempt, return PublishHandle)
//!     → broker.rs (transport: HTTP POST of the composite JSON)
//!     → outcome sent on the handle's oneshot channel
//! ```

pub mod broker;
pub mod sink;

pub use broker::{HttpBroker, MessageBroker, PublishError};
pub use sink::{PublishHandle, PublishSink};
