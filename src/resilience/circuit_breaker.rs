//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls short-circuit to the fallback
//! - Half-Open: a single trial call tests whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: max_failures consecutive failures, none older than the failure window
//! Open → Half-Open: first call after reset_timeout
//! Half-Open → Closed: trial call succeeds (failure count reset)
//! Half-Open → Open: trial call fails (reset timer restarted)
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency kind, never shared
//! - A Closed call is retried `max_retries` times before it counts as one failure;
//!   the half-open trial is a single attempt
//! - Any success while Closed clears the failure count
//! - Every attempt is bounded by `call_timeout`
//! - Calls only settle the state they were admitted under; a Closed-era call
//!   finishing after a transition is ignored
//! - With `fallback_on_failure`, failures never reach the caller

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::config::BreakerSettings;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// Fallback value for a call that failed.
pub const FAILURE_MARKER: &str = "[failure]";

/// Fallback value for a call short-circuited by an open circuit.
pub const OPEN_MARKER: &str = "[open]";

/// Breaker settings with durations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerConfig {
    pub max_failures: u32,
    pub max_retries: u32,
    pub call_timeout: Duration,
    pub reset_timeout: Duration,
    pub failure_window: Duration,
    pub fallback_on_failure: bool,
}

impl From<&BreakerSettings> for BreakerConfig {
    fn from(settings: &BreakerSettings) -> Self {
        Self {
            max_failures: settings.max_failures,
            max_retries: settings.max_retries,
            call_timeout: Duration::from_millis(settings.call_timeout_ms),
            reset_timeout: Duration::from_millis(settings.reset_timeout_ms),
            failure_window: Duration::from_millis(settings.failure_window_ms),
            fallback_on_failure: settings.fallback_on_failure,
        }
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self::from(&BreakerSettings::default())
    }
}

/// Circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settled result of a guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The dependency answered.
    Success(T),
    /// The failure was absorbed and replaced by the fallback value.
    Fallback(T),
}

impl<T> Outcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            Outcome::Success(value) | Outcome::Fallback(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }
}

/// Why a guarded call did not produce a value.
#[derive(Debug, Error)]
pub enum CallFailure<E> {
    /// Short-circuited without calling the dependency.
    #[error("circuit open")]
    Open,

    /// An attempt exceeded the breaker deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The last attempt failed.
    #[error("{0}")]
    Failed(E),

    /// The fallback itself failed.
    #[error("fallback failed: {0}")]
    FallbackFailed(E),
}

impl<E> CallFailure<E> {
    /// Fallback marker describing this failure.
    pub fn marker(&self) -> &'static str {
        match self {
            CallFailure::Open => OPEN_MARKER,
            _ => FAILURE_MARKER,
        }
    }
}

type OpenHook = Arc<dyn Fn(&str) + Send + Sync>;

struct BreakerState {
    state: CircuitState,
    failures: VecDeque<Instant>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    /// Bumped on every transition.
    generation: u64,
}

impl BreakerState {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.failures.front() {
            if now.duration_since(oldest) >= window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }

    fn transition(&mut self, to: CircuitState) {
        self.state = to;
        self.generation += 1;
    }

    fn open(&mut self, now: Instant) {
        self.transition(CircuitState::Open);
        self.opened_at = Some(now);
        self.trial_in_flight = false;
    }
}

enum Admission {
    Pass(Ticket),
    Reject,
}

/// The state a call was admitted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ticket {
    Closed { generation: u64 },
    Trial,
}

/// Failure-counting guard around calls to one dependency.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    state: Mutex<BreakerState>,
    open_hook: Option<OpenHook>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: VecDeque::new(),
                opened_at: None,
                trial_in_flight: false,
                generation: 0,
            }),
            open_hook: None,
        }
    }

    /// Register a callback run whenever the circuit opens.
    pub fn with_open_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&str) + Send + Sync + 'static,
    {
        self.open_hook = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state. Does not advance Open to Half-Open.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Failures counted in the current window.
    pub fn failure_count(&self) -> usize {
        let mut state = self.lock();
        state.prune(Instant::now(), self.config.failure_window);
        state.failures.len()
    }

    /// Run `call` under the breaker, substituting `fallback` on failure.
    ///
    /// `call` is invoked once per attempt, and exactly once for a half-open
    /// trial. When the circuit is open it is not invoked at all and the
    /// fallback receives `CallFailure::Open`.
    pub async fn execute<T, E, F, Fut, FB>(
        &self,
        mut call: F,
        fallback: FB,
    ) -> Result<Outcome<T>, CallFailure<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce(&CallFailure<E>) -> Result<T, E>,
        E: fmt::Display,
    {
        let ticket = match self.admit() {
            Admission::Reject => return self.recover(CallFailure::Open, fallback),
            Admission::Pass(ticket) => ticket,
        };

        let result = match ticket {
            Ticket::Closed { .. } => self.attempt(&mut call).await,
            Ticket::Trial => {
                let mut guard = TrialGuard::new(self);
                let result = with_deadline(self.config.call_timeout, call()).await;
                guard.settle();
                result
            }
        };

        match result {
            Ok(value) => {
                self.on_success(ticket);
                Ok(Outcome::Success(value))
            }
            Err(failure) => {
                tracing::warn!(breaker = %self.name, error = %failure, "Guarded call failed");
                self.on_failure(ticket);
                self.recover(failure, fallback)
            }
        }
    }

    async fn attempt<T, E, F, Fut>(&self, call: &mut F) -> Result<T, CallFailure<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut retries = 0;
        loop {
            let failure = match with_deadline(self.config.call_timeout, call()).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            if retries >= self.config.max_retries {
                return Err(failure);
            }
            retries += 1;
            tracing::debug!(breaker = %self.name, retry = retries, error = %failure, "Retrying guarded call");
        }
    }

    fn recover<T, E, FB>(&self, failure: CallFailure<E>, fallback: FB) -> Result<Outcome<T>, CallFailure<E>>
    where
        FB: FnOnce(&CallFailure<E>) -> Result<T, E>,
    {
        if !self.config.fallback_on_failure {
            return Err(failure);
        }
        match fallback(&failure) {
            Ok(value) => {
                metrics::record_fallback(&self.name, failure.marker());
                Ok(Outcome::Fallback(value))
            }
            Err(e) => Err(CallFailure::FallbackFailed(e)),
        }
    }

    fn admit(&self) -> Admission {
        let now = Instant::now();
        let mut state = self.lock();
        match state.state {
            CircuitState::Closed => Admission::Pass(Ticket::Closed {
                generation: state.generation,
            }),
            CircuitState::Open => {
                let elapsed = state
                    .opened_at
                    .map(|at| now.duration_since(at))
                    .unwrap_or_default();
                if elapsed < self.config.reset_timeout {
                    return Admission::Reject;
                }
                state.transition(CircuitState::HalfOpen);
                state.trial_in_flight = true;
                drop(state);
                tracing::info!(breaker = %self.name, "Circuit half-open, allowing trial call");
                metrics::record_breaker_transition(&self.name, CircuitState::HalfOpen);
                Admission::Pass(Ticket::Trial)
            }
            CircuitState::HalfOpen if state.trial_in_flight => Admission::Reject,
            CircuitState::HalfOpen => {
                state.trial_in_flight = true;
                Admission::Pass(Ticket::Trial)
            }
        }
    }

    fn on_success(&self, ticket: Ticket) {
        let mut state = self.lock();
        match (ticket, state.state) {
            (Ticket::Closed { generation }, CircuitState::Closed) if generation == state.generation => {
                state.failures.clear();
            }
            (Ticket::Trial, CircuitState::HalfOpen) => {
                state.transition(CircuitState::Closed);
                state.failures.clear();
                state.opened_at = None;
                state.trial_in_flight = false;
                drop(state);

                tracing::info!(breaker = %self.name, "Circuit closed after successful trial");
                metrics::record_breaker_transition(&self.name, CircuitState::Closed);
            }
            _ => {}
        }
    }

    fn on_failure(&self, ticket: Ticket) {
        let now = Instant::now();
        let mut state = self.lock();
        let opened = match (ticket, state.state) {
            (Ticket::Closed { generation }, CircuitState::Closed) if generation == state.generation => {
                state.failures.push_back(now);
                state.prune(now, self.config.failure_window);
                if state.failures.len() >= self.config.max_failures as usize {
                    state.open(now);
                    true
                } else {
                    false
                }
            }
            (Ticket::Trial, CircuitState::HalfOpen) => {
                state.open(now);
                true
            }
            _ => false,
        };
        drop(state);

        if opened {
            self.notify_open();
        }
    }

    fn notify_open(&self) {
        tracing::warn!(
            breaker = %self.name,
            reset_after = ?self.config.reset_timeout,
            "Circuit opened"
        );
        metrics::record_breaker_transition(&self.name, CircuitState::Open);
        if let Some(hook) = &self.open_hook {
            hook(&self.name);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Tracks the half-open trial; a trial dropped before settling re-opens the circuit.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl<'a> TrialGuard<'a> {
    fn new(breaker: &'a CircuitBreaker) -> Self {
        Self {
            breaker,
            settled: false,
        }
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(breaker = %self.breaker.name, "Trial call abandoned");
            self.breaker.on_failure(Ticket::Trial);
        }
    }
}
