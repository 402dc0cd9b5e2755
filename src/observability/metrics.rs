//! Metrics collection and exposition.
//!
//! # Metrics
//! - `insult_dependency_requests_total` (counter): dependency calls by kind, outcome
//! - `insult_breaker_transitions_total` (counter): state changes by breaker, target state
//! - `insult_fallbacks_total` (counter): fallback substitutions by breaker, marker
//! - `insult_publish_total` (counter): publish attempts by outcome
//! - `insult_aggregate_duration_seconds` (histogram): fan-out latency by outcome
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;
use crate::upstream::DependencyKind;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dependency_request(kind: DependencyKind, outcome: &'static str) {
    counter!(
        "insult_dependency_requests_total",
        "kind" => kind.field(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_breaker_transition(breaker: &str, to: CircuitState) {
    counter!(
        "insult_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_fallback(breaker: &str, marker: &'static str) {
    counter!(
        "insult_fallbacks_total",
        "breaker" => breaker.to_string(),
        "marker" => marker
    )
    .increment(1);
}

pub fn record_publish(outcome: &'static str) {
    counter!("insult_publish_total", "outcome" => outcome).increment(1);
}

pub fn record_aggregate(outcome: &'static str, start: Instant) {
    histogram!("insult_aggregate_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
