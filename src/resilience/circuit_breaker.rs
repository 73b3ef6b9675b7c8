//! Circuit breaker guarding the downstream dependency.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: a bounded number of probe calls test for recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: first allow() after reset_timeout (reserves a probe slot)
//! Half-Open → Closed: probe succeeds
//! Half-Open → Open: probe fails (timer restarts)
//! ```
//!
//! # Design Decisions
//! - One mutex around all runtime state; check-then-transition is a single critical section
//! - `allow()` hands out a permit; the permit settles the attempt exactly once
//! - Every transition bumps an epoch; outcomes from an older epoch are ignored
//! - Time is `tokio::time::Instant` so paused-clock tests drive the timers

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Breaker state. Exactly one is current at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "CLOSED",
            BreakerState::Open => "OPEN",
            BreakerState::HalfOpen => "HALF_OPEN",
        }
    }

    pub(crate) fn as_gauge(&self) -> f64 {
        match self {
            BreakerState::Closed => 0.0,
            BreakerState::Open => 1.0,
            BreakerState::HalfOpen => 2.0,
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct BreakerRuntime {
    state: BreakerState,
    consecutive_failures: u32,
    /// Set exactly while `state == Open`.
    opened_at: Option<Instant>,
    probes_in_flight: u32,
    epoch: u64,
}

/// Point-in-time copy of the breaker runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub probes_in_flight: u32,
    /// Time spent open so far; `None` unless open.
    pub open_for: Option<Duration>,
    /// Number of transitions since startup.
    pub transitions: u64,
}

/// Process-local circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    runtime: Mutex<BreakerRuntime>,
}

impl CircuitBreaker {
    /// Create a breaker in the closed state.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            runtime: Mutex::new(BreakerRuntime {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probes_in_flight: 0,
                epoch: 0,
            }),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = Instant::now();
        let rt = self.lock();
        BreakerSnapshot {
            state: rt.state,
            consecutive_failures: rt.consecutive_failures,
            probes_in_flight: rt.probes_in_flight,
            open_for: rt.opened_at.map(|at| now.saturating_duration_since(at)),
            transitions: rt.epoch,
        }
    }

    /// Remaining time before an open breaker admits a probe.
    ///
    /// `None` unless open; `Some(Duration::ZERO)` once a probe is allowed.
    pub fn time_until_probe_eligible(&self) -> Option<Duration> {
        let now = Instant::now();
        let rt = self.lock();
        if rt.state != BreakerState::Open {
            return None;
        }
        let elapsed = rt
            .opened_at
            .map_or(self.config.reset_timeout(), |at| now.saturating_duration_since(at));
        Some(self.config.reset_timeout().saturating_sub(elapsed))
    }

    /// Gate a call.
    ///
    /// Returns a permit when the call may reach the dependency. An expired open
    /// breaker moves to half-open and reserves a probe slot in the same step.
    pub fn allow(&self) -> Option<BreakerPermit<'_>> {
        let now = Instant::now();
        let mut rt = self.lock();

        let probe = match rt.state {
            BreakerState::Closed => false,
            BreakerState::Open => {
                let eligible = rt.opened_at.map_or(true, |at| {
                    now.saturating_duration_since(at) >= self.config.reset_timeout()
                });
                if !eligible {
                    drop(rt);
                    return self.reject();
                }
                self.transition(&mut rt, BreakerState::HalfOpen, now);
                rt.probes_in_flight = 1;
                true
            }
            BreakerState::HalfOpen => {
                if rt.probes_in_flight >= self.config.half_open_max_probes {
                    drop(rt);
                    return self.reject();
                }
                rt.probes_in_flight += 1;
                true
            }
        };

        if probe {
            tracing::info!(probes_in_flight = rt.probes_in_flight, "Admitting half-open probe");
        }

        Some(BreakerPermit {
            breaker: self,
            epoch: rt.epoch,
            probe,
            settled: false,
        })
    }

    fn reject(&self) -> Option<BreakerPermit<'_>> {
        tracing::debug!("Breaker OPEN: fast-fail without calling dependency");
        metrics::record_rejection();
        None
    }

    fn settle(&self, epoch: u64, probe: bool, success: Option<bool>) {
        let now = Instant::now();
        let mut rt = self.lock();

        if rt.epoch != epoch {
            if success.is_some() {
                tracing::debug!(
                    permit_epoch = epoch,
                    current_epoch = rt.epoch,
                    state = %rt.state,
                    "Ignoring outcome from an earlier breaker state"
                );
            }
            return;
        }

        if probe {
            rt.probes_in_flight = rt.probes_in_flight.saturating_sub(1);
        }

        let Some(success) = success else {
            return;
        };

        match (rt.state, success) {
            (BreakerState::Closed, true) => rt.consecutive_failures = 0,
            (BreakerState::Closed, false) => {
                rt.consecutive_failures += 1;
                if rt.consecutive_failures >= self.config.failure_threshold {
                    self.transition(&mut rt, BreakerState::Open, now);
                }
            }
            (BreakerState::HalfOpen, true) => self.transition(&mut rt, BreakerState::Closed, now),
            (BreakerState::HalfOpen, false) => self.transition(&mut rt, BreakerState::Open, now),
            // Permits are never issued while open.
            (BreakerState::Open, _) => {}
        }
    }

    fn transition(&self, rt: &mut BreakerRuntime, to: BreakerState, now: Instant) {
        let from = rt.state;
        rt.state = to;
        rt.epoch += 1;
        rt.probes_in_flight = 0;

        match to {
            BreakerState::Open => rt.opened_at = Some(now),
            BreakerState::HalfOpen => rt.opened_at = None,
            BreakerState::Closed => {
                rt.opened_at = None;
                rt.consecutive_failures = 0;
            }
        }

        tracing::warn!(
            from = %from,
            to = %to,
            consecutive_failures = rt.consecutive_failures,
            "[CB Transition] {} -> {}",
            from,
            to
        );
        metrics::record_transition(from, to);
    }

    fn lock(&self) -> MutexGuard<'_, BreakerRuntime> {
        // No code path panics while holding the lock, so a poisoned guard is still consistent.
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Admission granted by [`CircuitBreaker::allow`].
///
/// Settle it with [`BreakerPermit::record_outcome`]. Dropping an unsettled
/// permit only frees its probe slot; it does not count as a success or failure.
#[must_use = "a permit must be settled with record_outcome"]
#[derive(Debug)]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    epoch: u64,
    probe: bool,
    settled: bool,
}

impl BreakerPermit<'_> {
    /// Whether this permit is a half-open probe.
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    /// Report the attempt's final result and drive the transition table.
    pub fn record_outcome(mut self, success: bool) {
        self.settled = true;
        self.breaker.settle(self.epoch, self.probe, Some(success));
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.settle(self.epoch, self.probe, None);
        }
    }
}
