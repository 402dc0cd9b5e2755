//! Resilient fan-out insult aggregator.

pub mod aggregate;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod publish;
pub mod resilience;
pub mod service;
pub mod upstream;

pub use aggregate::CompositeResult;
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::InsultService;
