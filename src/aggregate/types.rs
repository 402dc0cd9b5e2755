//! Composite result and aggregation error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::{Outcome, FAILURE_MARKER, OPEN_MARKER};
use crate::upstream::DependencyKind;

/// A settled dependency result tagged with the kind that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: DependencyKind,
    pub outcome: Outcome<String>,
}

impl Fragment {
    pub fn new(kind: DependencyKind, outcome: Outcome<String>) -> Self {
        Self { kind, outcome }
    }

    /// The word, or the fallback marker that replaced it.
    pub fn value(&self) -> &str {
        match &self.outcome {
            Outcome::Success(word) | Outcome::Fallback(word) => word,
        }
    }
}

/// One noun and two adjectives, each a real word or a fallback marker.
///
/// `adj1` and `adj2` are an unordered pair: their order follows completion
/// order of the adjective calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeResult {
    noun: String,
    adj1: String,
    adj2: String,
}

impl CompositeResult {
    pub fn new(noun: impl Into<String>, adj1: impl Into<String>, adj2: impl Into<String>) -> Self {
        Self {
            noun: noun.into(),
            adj1: adj1.into(),
            adj2: adj2.into(),
        }
    }

    pub fn noun(&self) -> &str {
        &self.noun
    }

    pub fn adjectives(&self) -> [&str; 2] {
        [&self.adj1, &self.adj2]
    }

    /// True when any field carries a fallback marker.
    pub fn is_degraded(&self) -> bool {
        [&self.noun, &self.adj1, &self.adj2]
            .iter()
            .any(|field| field.as_str() == FAILURE_MARKER || field.as_str() == OPEN_MARKER)
    }
}

/// Errors that abort a whole aggregation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// A guarded call failed without fallback recovery.
    #[error("failed to request {kind}: {cause}")]
    Dependency { kind: DependencyKind, cause: String },

    /// The settled results did not contain one noun and two adjectives.
    #[error("expected 1 noun and 2 adjectives, got {nouns} and {adjectives}")]
    Contract { nouns: usize, adjectives: usize },

    /// A dispatched call task panicked or was cancelled.
    #[error("aggregation task failed: {0}")]
    Task(String),
}
