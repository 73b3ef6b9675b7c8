//! Guarded call path: breaker gate, timed attempts, backoff, one breaker outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::observability::metrics;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::outcome::{AttemptError, CallOutcome};
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::with_deadline;

/// Runs units of work through the circuit breaker and retry policy.
#[derive(Debug)]
pub struct ResilientCallExecutor {
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl ResilientCallExecutor {
    pub fn new(breaker: Arc<CircuitBreaker>, policy: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            breaker,
            policy,
            attempt_timeout,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute one guarded call.
    ///
    /// `work` is invoked once per attempt. A rejected call returns
    /// [`CallOutcome::BreakerOpen`] without invoking it; otherwise the breaker
    /// receives exactly one outcome once retries settle.
    pub async fn execute<T, F, Fut>(&self, work: F) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let call_id = Uuid::new_v4();
        let span = tracing::info_span!("call", %call_id);
        self.execute_inner(work).instrument(span).await
    }

    async fn execute_inner<T, F, Fut>(&self, work: F) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let Some(permit) = self.breaker.allow() else {
            return CallOutcome::BreakerOpen;
        };

        let start = Instant::now();
        let outcome = self.run_attempts(work).await;
        permit.record_outcome(outcome.is_success());

        metrics::record_call(outcome.label(), start.elapsed());
        match outcome.cause() {
            Some(cause) => tracing::warn!(outcome = outcome.label(), error = %cause, "Call failed"),
            None => tracing::debug!(outcome = outcome.label(), "Call succeeded"),
        }

        outcome
    }

    async fn run_attempts<T, F, Fut>(&self, mut work: F) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = RetryPolicy::classify(with_deadline(self.attempt_timeout, work()).await);

            if !self.policy.should_retry(&outcome, attempts) {
                return outcome;
            }

            let attempt_index = attempts - 1;
            let delay = self.policy.next_delay(attempt_index);
            tracing::info!(
                attempt = attempts,
                max_attempts = self.policy.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                ceiling_ms = self.policy.delay_ceiling(attempt_index).as_millis() as u64,
                error = ?outcome.cause(),
                "Retrying after transient failure"
            );
            metrics::record_retry();
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakerConfig, RetryConfig};
    use crate::resilience::circuit_breaker::BreakerState;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn executor(failure_threshold: u32, max_attempts: u32) -> ResilientCallExecutor {
        let breaker = Arc::new(CircuitBreaker::new(BreakerConfig {
            failure_threshold,
            reset_timeout_ms: 1000,
            half_open_max_probes: 1,
        }));
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        });
        ResilientCallExecutor::new(breaker, policy, Duration::from_secs(2))
    }

    fn server_error() -> AttemptError {
        AttemptError::ServerError { status: 500, body: "backend error".into() }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_then_success_with_bounded_delays() {
        let exec = executor(5, 3);
        let calls = Mutex::new(Vec::new());

        let outcome = exec
            .execute(|| {
                let mut calls = calls.lock().unwrap();
                calls.push(Instant::now());
                let n = calls.len();
                async move {
                    if n < 3 {
                        Err(server_error())
                    } else {
                        Ok("payload")
                    }
                }
            })
            .await;

        assert_eq!(outcome, CallOutcome::Success("payload"));
        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.len(), 3);

        let delays: Vec<_> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(delays.len(), 2);
        assert!(delays[0] <= exec.policy().delay_ceiling(0));
        assert!(delays[1] <= exec.policy().delay_ceiling(1));
        assert_eq!(exec.breaker().snapshot().consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_short_circuits() {
        let exec = executor(5, 3);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let outcome: CallOutcome<()> = exec
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AttemptError::MalformedResponse("expected value".into())) }
            })
            .await;

        assert!(matches!(outcome, CallOutcome::PermanentFailure(AttemptError::MalformedResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(exec.breaker().snapshot().consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_last_cause() {
        let exec = executor(5, 3);
        let calls = AtomicU32::new(0);

        let outcome: CallOutcome<()> = exec
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(AttemptError::ServerError { status: 500 + n as u16, body: String::new() }) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            outcome,
            CallOutcome::TransientFailure(AttemptError::ServerError { status: 503, body: String::new() })
        );
        // Three attempts, one breaker failure.
        assert_eq!(exec.breaker().snapshot().consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_counts_as_timeout() {
        let exec = executor(5, 2);
        let calls = AtomicU32::new(0);

        let outcome: CallOutcome<()> = exec
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            outcome,
            CallOutcome::TransientFailure(AttemptError::Timeout(Duration::from_secs(2)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_two_scenario() {
        let exec = executor(2, 1);
        let calls = AtomicU32::new(0);
        let always_fail = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(server_error()) }
        };

        let first = exec.execute(always_fail).await;
        assert!(matches!(first, CallOutcome::TransientFailure(_)));
        assert_eq!(exec.breaker().state(), BreakerState::Closed);
        assert_eq!(exec.breaker().snapshot().consecutive_failures, 1);

        let second = exec.execute(always_fail).await;
        assert!(matches!(second, CallOutcome::TransientFailure(_)));
        assert_eq!(exec.breaker().state(), BreakerState::Open);

        let third = exec.execute(always_fail).await;
        assert_eq!(third, CallOutcome::BreakerOpen);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_after_reset_timeout() {
        let exec = executor(1, 1);
        let healthy = std::sync::atomic::AtomicBool::new(false);
        let work = || {
            let ok = healthy.load(Ordering::SeqCst);
            async move { if ok { Ok(()) } else { Err(server_error()) } }
        };

        exec.execute(work).await;
        assert_eq!(exec.breaker().state(), BreakerState::Open);

        tokio::time::advance(Duration::from_millis(1100)).await;
        healthy.store(true, Ordering::SeqCst);

        assert_eq!(exec.execute(work).await, CallOutcome::Success(()));
        assert_eq!(exec.breaker().state(), BreakerState::Closed);
        assert_eq!(exec.execute(work).await, CallOutcome::Success(()));
    }
}
