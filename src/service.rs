//! Service wiring.
//!
//! Builds one breaker per dependency kind and shares them between the
//! aggregator and the health reporter.

use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{AggregateError, Aggregator, CompositeResult};
use crate::config::{HealthRule, ServiceConfig};
use crate::health::{HealthReporter, HealthStatus};
use crate::publish::{HttpBroker, MessageBroker, PublishError, PublishHandle, PublishSink};
use crate::resilience::{BreakerConfig, CircuitBreaker, OPEN_MARKER};
use crate::upstream::{DependencyClient, DependencyError, DependencyKind, WordSource};

/// Errors raised while building the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("dependency client: {0}")]
    Dependency(#[from] DependencyError),

    #[error("publish broker: {0}")]
    Publish(#[from] PublishError),
}

/// The aggregation core: fan-out, publish and health.
#[derive(Clone)]
pub struct InsultService {
    aggregator: Aggregator,
    sink: Option<Arc<PublishSink>>,
    health: HealthReporter,
}

impl InsultService {
    /// Build the service and its collaborators from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client: Arc<dyn WordSource> = Arc::new(DependencyClient::new(config)?);
        let broker: Option<Arc<dyn MessageBroker>> = if config.publish.enabled {
            Some(Arc::new(HttpBroker::new(&config.publish)?))
        } else {
            None
        };

        Ok(Self::new(
            client,
            broker,
            BreakerConfig::from(&config.breaker),
            config.health.rule,
        ))
    }

    /// Build the service around injected collaborators.
    pub fn new(
        source: Arc<dyn WordSource>,
        broker: Option<Arc<dyn MessageBroker>>,
        breaker: BreakerConfig,
        rule: HealthRule,
    ) -> Self {
        let noun_breaker = Arc::new(breaker_for(DependencyKind::Noun, breaker.clone()));
        let adjective_breaker = Arc::new(breaker_for(DependencyKind::Adjective, breaker));

        Self {
            aggregator: Aggregator::new(source, noun_breaker.clone(), adjective_breaker.clone()),
            sink: broker.map(|broker| Arc::new(PublishSink::new(broker))),
            health: HealthReporter::new(noun_breaker, adjective_breaker, rule),
        }
    }

    pub async fn get_composite(&self) -> Result<CompositeResult, AggregateError> {
        self.aggregator.get_composite().await
    }

    /// Publish a composite. Reports `Closed` when publishing is disabled.
    pub fn publish(&self, composite: CompositeResult) -> PublishHandle {
        match &self.sink {
            Some(sink) => sink.publish(composite),
            None => PublishSink::disabled().publish(composite),
        }
    }

    pub fn check(&self) -> HealthStatus {
        self.health.check()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Release the publish connection.
    pub fn shutdown(&self) {
        if let Some(sink) = &self.sink {
            sink.close();
        }
    }
}

fn breaker_for(kind: DependencyKind, config: BreakerConfig) -> CircuitBreaker {
    CircuitBreaker::new(kind.key(), config).with_open_hook(|key| {
        tracing::error!("Timeout requesting '{}', returned '{}'", key, OPEN_MARKER);
    })
}
