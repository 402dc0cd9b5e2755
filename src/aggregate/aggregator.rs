//! Concurrent fan-out to the noun and adjective services.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::aggregate::composer::compose;
use crate::aggregate::types::{AggregateError, CompositeResult, Fragment};
use crate::observability::metrics;
use crate::resilience::{CallFailure, CircuitBreaker};
use crate::upstream::{DependencyError, DependencyKind, WordSource};

/// Calls dispatched for every composite, in dispatch order.
const DISPATCH: [DependencyKind; 3] = [
    DependencyKind::Noun,
    DependencyKind::Adjective,
    DependencyKind::Adjective,
];

/// Issues breaker-guarded calls concurrently and composes the results.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn WordSource>,
    noun_breaker: Arc<CircuitBreaker>,
    adjective_breaker: Arc<CircuitBreaker>,
}

impl Aggregator {
    pub fn new(
        source: Arc<dyn WordSource>,
        noun_breaker: Arc<CircuitBreaker>,
        adjective_breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            source,
            noun_breaker,
            adjective_breaker,
        }
    }

    pub fn breaker(&self, kind: DependencyKind) -> &Arc<CircuitBreaker> {
        match kind {
            DependencyKind::Noun => &self.noun_breaker,
            DependencyKind::Adjective => &self.adjective_breaker,
        }
    }

    /// Request one noun and two adjectives in parallel and compose them.
    ///
    /// All calls are spawned before any is awaited, and every call is awaited
    /// even when one fails. The first failure observed is returned.
    pub async fn get_composite(&self) -> Result<CompositeResult, AggregateError> {
        let start = Instant::now();
        tracing::info!("Received request");

        let mut pending: FuturesUnordered<_> = DISPATCH
            .iter()
            .map(|&kind| tokio::spawn(self.guarded(kind)))
            .collect();

        let mut fragments = Vec::with_capacity(DISPATCH.len());
        let mut first_error = None;
        while let Some(joined) = pending.next().await {
            let settled = joined
                .map_err(|e| AggregateError::Task(e.to_string()))
                .and_then(|fragment| fragment);
            match settled {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to request insult components");
                    first_error.get_or_insert(e);
                }
            }
        }

        let result = match first_error {
            Some(e) => Err(e),
            None => compose(&fragments),
        };
        match &result {
            Ok(composite) if composite.is_degraded() => metrics::record_aggregate("degraded", start),
            Ok(_) => metrics::record_aggregate("success", start),
            Err(_) => metrics::record_aggregate("error", start),
        }
        result
    }

    fn guarded(&self, kind: DependencyKind) -> impl Future<Output = Result<Fragment, AggregateError>> + Send + 'static {
        let source = self.source.clone();
        let breaker = self.breaker(kind).clone();

        async move {
            let outcome = breaker
                .execute(
                    || source.fetch_word(kind),
                    |failure: &CallFailure<DependencyError>| Ok(failure.marker().to_string()),
                )
                .await
                .map_err(|cause| AggregateError::Dependency {
                    kind,
                    cause: cause.to_string(),
                })?;
            Ok(Fragment::new(kind, outcome))
        }
    }
}
