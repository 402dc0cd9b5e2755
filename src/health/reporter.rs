//! Breaker-state health reporting.
//!
//! # Responsibilities
//! - Snapshot both breaker states without network calls
//! - Derive the overall status using the configured rule
//!
//! # Design Decisions
//! - Recomputed on every read, never cached
//! - The default rule reports OK when either breaker is Open; the
//!   conventional rule (OK only when both are Closed) is opt-in

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::HealthRule;
use crate::resilience::{CircuitBreaker, CircuitState};

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Degraded,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::Degraded => f.write_str("DEGRADED"),
        }
    }
}

/// Snapshot of both breakers and the derived status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(rename = "noun")]
    pub noun_state: CircuitState,
    #[serde(rename = "adj")]
    pub adj_state: CircuitState,
    pub status: Status,
}

impl HealthStatus {
    pub fn derive(noun_state: CircuitState, adj_state: CircuitState, rule: HealthRule) -> Self {
        let healthy = match rule {
            HealthRule::AnyOpenIsOk => {
                noun_state == CircuitState::Open || adj_state == CircuitState::Open
            }
            HealthRule::AllClosedIsOk => {
                noun_state == CircuitState::Closed && adj_state == CircuitState::Closed
            }
        };

        Self {
            noun_state,
            adj_state,
            status: if healthy { Status::Ok } else { Status::Degraded },
        }
    }
}

/// Reads breaker states on demand.
#[derive(Clone)]
pub struct HealthReporter {
    noun_breaker: Arc<CircuitBreaker>,
    adjective_breaker: Arc<CircuitBreaker>,
    rule: HealthRule,
}

impl HealthReporter {
    pub fn new(noun_breaker: Arc<CircuitBreaker>, adjective_breaker: Arc<CircuitBreaker>, rule: HealthRule) -> Self {
        Self {
            noun_breaker,
            adjective_breaker,
            rule,
        }
    }

    pub fn check(&self) -> HealthStatus {
        HealthStatus::derive(self.noun_breaker.state(), self.adjective_breaker.state(), self.rule)
    }
}
