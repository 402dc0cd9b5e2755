//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the insult service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Location of the noun service.
    pub noun: EndpointConfig,

    /// Location of the adjective service.
    pub adjective: EndpointConfig,

    /// Optional outbound proxy for dependency calls.
    pub proxy: Option<ProxyOptions>,

    /// Dependency HTTP client settings.
    pub client: ClientConfig,

    /// Circuit breaker settings, shared by both breakers.
    pub breaker: BreakerSettings,

    /// Publish sink settings.
    pub publish: PublishConfig,

    /// Health status derivation.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            noun: EndpointConfig::new("localhost", 8081),
            adjective: EndpointConfig::new("localhost", 8082),
            proxy: None,
            client: ClientConfig::default(),
            breaker: BreakerSettings::default(),
            publish: PublishConfig::default(),
            health: HealthConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Host/port pair of an upstream dependency.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new("localhost", 8080)
    }
}

/// Outbound HTTP proxy used for dependency calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyOptions {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Dependency HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { timeout_ms: 1000 }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Failures within the window before the circuit opens.
    pub max_failures: u32,

    /// Retries against the dependency before an attempt counts as one failure.
    pub max_retries: u32,

    /// Deadline for each attempt in milliseconds.
    pub call_timeout_ms: u64,

    /// Time spent Open before a half-open trial is allowed, in milliseconds.
    pub reset_timeout_ms: u64,

    /// Rolling window in which failures are counted, in milliseconds.
    pub failure_window_ms: u64,

    /// Replace failures with the fallback value instead of propagating them.
    pub fallback_on_failure: bool,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            max_failures: 2,
            max_retries: 2,
            call_timeout_ms: 500,
            reset_timeout_ms: 15_000,
            failure_window_ms: 10_000,
            fallback_on_failure: true,
        }
    }
}

/// Publish sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Enable publishing composed results.
    pub enabled: bool,

    /// Endpoint that receives the composite JSON.
    pub endpoint: String,

    /// Publish request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:8083/api/v1/publish".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Rule used to derive the overall health status from breaker states.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthRule {
    /// `OK` when either breaker is Open, otherwise `DEGRADED`.
    #[default]
    AnyOpenIsOk,
    /// `OK` only when both breakers are Closed.
    AllClosedIsOk,
}

/// Health reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HealthConfig {
    pub rule: HealthRule,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
