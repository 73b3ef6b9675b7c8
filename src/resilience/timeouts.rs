//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap every attempt against the dependency with a deadline
//! - Turn an elapsed deadline into `AttemptError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the timed-out future is dropped
//! - The per-attempt timeout is independent of (and shorter than) retry backoff

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::resilience::outcome::AttemptError;

/// Run one attempt under `deadline`.
pub async fn with_deadline<T, F>(deadline: Duration, attempt: F) -> Result<T, AttemptError>
where
    F: Future<Output = Result<T, AttemptError>>,
{
    match timeout(deadline, attempt).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_times_out() {
        let result: Result<(), _> = with_deadline(Duration::from_secs(2), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(AttemptError::Timeout(Duration::from_secs(2))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_attempt_passes_through() {
        let result = with_deadline(Duration::from_secs(2), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err::<(), _>(AttemptError::Transport("refused".into()))
        })
        .await;
        assert_eq!(result, Err(AttemptError::Transport("refused".into())));
    }
}
