//! Dependency kinds and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which upstream a call targets, and which composite field it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Noun,
    Adjective,
}

impl DependencyKind {
    /// Request path on the dependency.
    pub fn path(self) -> &'static str {
        match self {
            DependencyKind::Noun => "/api/v1/noun",
            DependencyKind::Adjective => "/api/v1/adjective",
        }
    }

    /// JSON field carrying the word in a successful response.
    pub fn field(self) -> &'static str {
        match self {
            DependencyKind::Noun => "noun",
            DependencyKind::Adjective => "adjective",
        }
    }

    /// Short key used in logs and health output.
    pub fn key(self) -> &'static str {
        match self {
            DependencyKind::Noun => "noun",
            DependencyKind::Adjective => "adj",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Errors that can occur while calling a dependency.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyError {
    /// The dependency answered with a status of 400 or above.
    #[error("{status}: {status_message}\n{body}")]
    Http {
        status: u16,
        status_message: String,
        body: String,
    },

    /// The request did not complete within the client timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Connection or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The JSON body lacked the expected string field.
    #[error("{kind} response is missing the '{field}' field")]
    MissingField { kind: DependencyKind, field: &'static str },

    /// The configured host, port or proxy does not form a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl DependencyError {
    pub fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            DependencyError::Timeout(timeout_ms)
        } else if err.is_decode() {
            DependencyError::Decode(err.to_string())
        } else {
            DependencyError::Transport(err.to_string())
        }
    }
}

/// Result type for dependency calls.
pub type DependencyResult<T> = Result<T, DependencyError>;
