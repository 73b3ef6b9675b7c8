//! Exponential backoff with full jitter.

use rand::Rng;
use std::time::Duration;

/// Upper bound of the delay before retry `attempt_index` (0 = before the 2nd attempt).
///
/// `min(max, base * 2^attempt_index)`, saturating instead of overflowing.
pub fn backoff_ceiling(attempt_index: u32, base: Duration, max: Duration) -> Duration {
    2u32.checked_pow(attempt_index)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(max, |delay| delay.min(max))
}

/// Draw a delay uniformly from `[0, ceiling]`.
pub fn full_jitter(ceiling: Duration) -> Duration {
    let upper = u64::try_from(ceiling.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(rand::thread_rng().gen_range(0..=upper))
}

/// Calculate a full-jitter exponential backoff delay.
pub fn calculate_backoff(attempt_index: u32, base: Duration, max: Duration) -> Duration {
    full_jitter(backoff_ceiling(attempt_index, base, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(200);
    const MAX: Duration = Duration::from_millis(2000);

    #[test]
    fn test_ceiling_doubles_then_caps() {
        assert_eq!(backoff_ceiling(0, BASE, MAX), Duration::from_millis(200));
        assert_eq!(backoff_ceiling(1, BASE, MAX), Duration::from_millis(400));
        assert_eq!(backoff_ceiling(3, BASE, MAX), Duration::from_millis(1600));
        assert_eq!(backoff_ceiling(4, BASE, MAX), MAX);
        assert_eq!(backoff_ceiling(40, BASE, MAX), MAX);
        assert_eq!(backoff_ceiling(u32::MAX, BASE, MAX), MAX);
    }

    #[test]
    fn test_backoff_within_bounds() {
        for attempt_index in 0..12 {
            let ceiling = backoff_ceiling(attempt_index, BASE, MAX);
            for _ in 0..200 {
                let delay = calculate_backoff(attempt_index, BASE, MAX);
                assert!(delay <= ceiling, "{delay:?} > {ceiling:?} at index {attempt_index}");
            }
        }
    }

    #[test]
    fn test_zero_ceiling_means_no_delay() {
        assert_eq!(calculate_backoff(3, Duration::ZERO, MAX), Duration::ZERO);
        assert_eq!(calculate_backoff(3, BASE, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_jitter_spreads_delays() {
        let delays: std::collections::HashSet<_> =
            (0..50).map(|_| calculate_backoff(2, BASE, MAX)).collect();
        assert!(delays.len() > 1, "full jitter should not produce a constant delay");
    }
}
