//! Call outcomes and attempt-level errors.

use std::time::Duration;
use thiserror::Error;

/// Why a single attempt against the dependency failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The attempt exceeded its per-attempt deadline.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The dependency answered with a 5xx status.
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },

    /// The dependency answered with a non-success, non-5xx status.
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// The response arrived but could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Connection-level failure other than a timeout.
    #[error("transport error: {0}")]
    Transport(String),
}

impl AttemptError {
    /// Timeouts and server errors are worth retrying; everything else is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, AttemptError::Timeout(_) | AttemptError::ServerError { .. })
    }
}

/// Terminal result of one guarded call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success(T),
    /// Retryable failure; surfaced once attempts are exhausted.
    TransientFailure(AttemptError),
    /// Non-retryable failure.
    PermanentFailure(AttemptError),
    /// The breaker rejected the call; the dependency was not contacted.
    BreakerOpen,
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    /// The failure cause, if the call was attempted and failed.
    pub fn cause(&self) -> Option<&AttemptError> {
        match self {
            CallOutcome::TransientFailure(e) | CallOutcome::PermanentFailure(e) => Some(e),
            _ => None,
        }
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Success(_) => "success",
            CallOutcome::TransientFailure(_) => "transient_failure",
            CallOutcome::PermanentFailure(_) => "permanent_failure",
            CallOutcome::BreakerOpen => "breaker_open",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(AttemptError::Timeout(Duration::from_secs(2)).is_transient());
        assert!(AttemptError::ServerError { status: 503, body: String::new() }.is_transient());
        assert!(!AttemptError::UnexpectedStatus { status: 404 }.is_transient());
        assert!(!AttemptError::MalformedResponse("eof".into()).is_transient());
        assert!(!AttemptError::Transport("refused".into()).is_transient());
    }

    #[test]
    fn test_cause_keeps_original_error() {
        let err = AttemptError::ServerError { status: 500, body: "backend error".into() };
        let outcome: CallOutcome<()> = CallOutcome::TransientFailure(err.clone());
        assert_eq!(outcome.cause(), Some(&err));
        assert_eq!(outcome.label(), "transient_failure");
        assert_eq!(CallOutcome::<()>::BreakerOpen.cause(), None);
        assert_eq!(err.to_string(), "server error 500: backend error");
    }
}
