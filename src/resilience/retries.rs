//! Retry policy.
//!
//! # Responsibilities
//! - Classify attempt results into call outcomes
//! - Compute the full-jitter delay before the next attempt
//! - Bound the number of attempts per call
//!
//! # Design Decisions
//! - Only timeouts and 5xx responses are retried
//! - Permanent failures short-circuit with no delay
//! - After the last attempt the latest outcome is surfaced unchanged

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::{backoff_ceiling, full_jitter};
use crate::resilience::outcome::{AttemptError, CallOutcome};

/// Decides what to retry and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Total attempts allowed per call (never less than one).
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Map a raw attempt result onto a call outcome.
    pub fn classify<T>(result: Result<T, AttemptError>) -> CallOutcome<T> {
        match result {
            Ok(payload) => CallOutcome::Success(payload),
            Err(e) if e.is_transient() => CallOutcome::TransientFailure(e),
            Err(e) => CallOutcome::PermanentFailure(e),
        }
    }

    /// Whether another attempt should follow `outcome`, given `attempts` made so far.
    pub fn should_retry<T>(&self, outcome: &CallOutcome<T>, attempts: u32) -> bool {
        matches!(outcome, CallOutcome::TransientFailure(_)) && attempts < self.max_attempts()
    }

    /// Largest delay `next_delay(attempt_index)` can return.
    pub fn delay_ceiling(&self, attempt_index: u32) -> Duration {
        backoff_ceiling(attempt_index, self.config.base_delay(), self.config.max_delay())
    }

    /// Delay before the next attempt; index 0 is the wait before the 2nd attempt.
    pub fn next_delay(&self, attempt_index: u32) -> Duration {
        full_jitter(self.delay_ceiling(attempt_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        })
    }

    #[test]
    fn test_classify() {
        assert_eq!(RetryPolicy::classify(Ok::<_, AttemptError>(7)), CallOutcome::Success(7));

        let timeout = AttemptError::Timeout(Duration::from_secs(2));
        assert_eq!(
            RetryPolicy::classify::<()>(Err(timeout.clone())),
            CallOutcome::TransientFailure(timeout)
        );

        let server = AttemptError::ServerError { status: 500, body: "backend error".into() };
        assert_eq!(
            RetryPolicy::classify::<()>(Err(server.clone())),
            CallOutcome::TransientFailure(server)
        );

        let malformed = AttemptError::MalformedResponse("expected value".into());
        assert_eq!(
            RetryPolicy::classify::<()>(Err(malformed.clone())),
            CallOutcome::PermanentFailure(malformed)
        );
    }

    #[test]
    fn test_should_retry_only_transient_with_budget_left() {
        let policy = policy(3);
        let transient = CallOutcome::<()>::TransientFailure(AttemptError::Timeout(Duration::ZERO));
        let permanent = CallOutcome::<()>::PermanentFailure(AttemptError::UnexpectedStatus { status: 404 });

        assert!(policy.should_retry(&transient, 1));
        assert!(policy.should_retry(&transient, 2));
        assert!(!policy.should_retry(&transient, 3));
        assert!(!policy.should_retry(&permanent, 1));
        assert!(!policy.should_retry(&CallOutcome::Success(()), 1));
    }

    #[test]
    fn test_next_delay_bounds_for_every_attempt() {
        let policy = policy(6);
        for attempt_index in 0..policy.max_attempts() {
            let ceiling = policy.delay_ceiling(attempt_index);
            assert_eq!(
                ceiling,
                Duration::from_millis((100u64 << attempt_index).min(1000))
            );
            for _ in 0..100 {
                assert!(policy.next_delay(attempt_index) <= ceiling);
            }
        }
    }

    #[test]
    fn test_zero_attempts_treated_as_one() {
        assert_eq!(policy(0).max_attempts(), 1);
    }
}
