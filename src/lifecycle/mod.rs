//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger (latched)
//!
//! Shutdown (shutdown.rs):
//!     trigger → HTTP server stops accepting → in-flight requests drain
//!             → publish sink closed → exit
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain, close publish connection
//! - Breakers are never torn down explicitly; they die with the service

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
pub use signals::wait_for_signal;
