//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, timeout + trace layers)
//!     → request.rs (x-request-id assigned or propagated)
//!     → handler → InsultService (aggregate / publish / health)
//!     → JSON response
//! ```

pub mod request;
pub mod server;

pub use request::{MakeUuidRequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
