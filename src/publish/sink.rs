//! Fire-and-report publishing of composed results.
//!
//! # Responsibilities
//! - Hand each composite to the broker exactly once, off the caller's task
//! - Report the outcome on a per-publish completion channel
//! - Release the broker on shutdown
//!
//! # Design Decisions
//! - No internal retry; callers decide whether to publish again
//! - A publish failure never affects the composite already returned

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::aggregate::CompositeResult;
use crate::observability::metrics;
use crate::publish::broker::{MessageBroker, PublishError};

/// Completion channel of a single publish attempt.
#[derive(Debug)]
pub struct PublishHandle {
    rx: oneshot::Receiver<Result<(), PublishError>>,
}

impl PublishHandle {
    /// Wait for the publish attempt to finish.
    pub async fn outcome(self) -> Result<(), PublishError> {
        self.rx.await.unwrap_or(Err(PublishError::Dropped))
    }
}

/// Forwards composites to an external messaging endpoint.
pub struct PublishSink {
    broker: Mutex<Option<Arc<dyn MessageBroker>>>,
}

impl PublishSink {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self {
            broker: Mutex::new(Some(broker)),
        }
    }

    /// A sink with no broker. Every publish reports `Closed`.
    pub fn disabled() -> Self {
        Self {
            broker: Mutex::new(None),
        }
    }

    /// Start one publish attempt and return its completion channel.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn publish(&self, composite: CompositeResult) -> PublishHandle {
        let (tx, rx) = oneshot::channel();
        let broker = self.broker.lock().unwrap_or_else(PoisonError::into_inner).clone();

        match broker {
            Some(broker) => {
                tokio::spawn(async move {
                    let result = broker.send(&composite).await;
                    match &result {
                        Ok(()) => {
                            tracing::debug!(noun = %composite.noun(), "Published composite");
                            metrics::record_publish("success");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to publish composite");
                            metrics::record_publish("error");
                        }
                    }
                    let _ = tx.send(result);
                });
            }
            None => {
                tracing::warn!("Publish skipped, sink closed or disabled");
                metrics::record_publish("closed");
                let _ = tx.send(Err(PublishError::Closed));
            }
        }

        PublishHandle { rx }
    }

    /// Release the broker. In-flight publishes still complete.
    pub fn close(&self) {
        if self.broker.lock().unwrap_or_else(PoisonError::into_inner).take().is_some() {
            tracing::info!("Publish sink closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.broker.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}
