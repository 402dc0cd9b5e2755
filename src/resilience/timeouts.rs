//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap each guarded attempt with the breaker deadline
//! - Drop the in-flight future on expiry so late results are discarded
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use crate::resilience::circuit_breaker::CallFailure;

/// Run `fut` with a deadline, flattening its error into a `CallFailure`.
pub async fn with_deadline<T, E, F>(deadline: Duration, fut: F) -> Result<T, CallFailure<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CallFailure::Failed(e)),
        Err(_) => Err(CallFailure::Timeout(deadline)),
    }
}
