//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that the breaker deadline fires before the client timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{EndpointConfig, ServiceConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{section}.host must not be empty")]
    EmptyHost { section: &'static str },

    #[error("{section}.port must be non-zero")]
    ZeroPort { section: &'static str },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("breaker.call_timeout_ms ({breaker_ms}) must not exceed client.timeout_ms ({client_ms})")]
    BreakerTimeoutExceedsClient { breaker_ms: u64, client_ms: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("publish.endpoint is not a valid URL: {0}")]
    InvalidPublishEndpoint(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_endpoint("noun", &config.noun, &mut errors);
    check_endpoint("adjective", &config.adjective, &mut errors);
    if let Some(proxy) = &config.proxy {
        check_endpoint("proxy", &EndpointConfig::new(proxy.host.clone(), proxy.port), &mut errors);
    }

    let non_zero = [
        ("client.timeout_ms", config.client.timeout_ms),
        ("breaker.max_failures", u64::from(config.breaker.max_failures)),
        ("breaker.call_timeout_ms", config.breaker.call_timeout_ms),
        ("breaker.reset_timeout_ms", config.breaker.reset_timeout_ms),
        ("breaker.failure_window_ms", config.breaker.failure_window_ms),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    if config.breaker.call_timeout_ms > config.client.timeout_ms {
        errors.push(ValidationError::BreakerTimeoutExceedsClient {
            breaker_ms: config.breaker.call_timeout_ms,
            client_ms: config.client.timeout_ms,
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.publish.enabled {
        if url::Url::parse(&config.publish.endpoint).is_err() {
            errors.push(ValidationError::InvalidPublishEndpoint(config.publish.endpoint.clone()));
        }
        if config.publish.timeout_ms == 0 {
            errors.push(ValidationError::ZeroValue { field: "publish.timeout_ms" });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(section: &'static str, endpoint: &EndpointConfig, errors: &mut Vec<ValidationError>) {
    if endpoint.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost { section });
    }
    if endpoint.port == 0 {
        errors.push(ValidationError::ZeroPort { section });
    }
}
