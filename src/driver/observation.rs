//! Latest-cycle record published by the driving loop.

use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::resilience::{BreakerState, CallOutcome};

/// Why a cycle issued its call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    /// Breaker was not open.
    Normal,
    /// Breaker was open and its reset timeout had elapsed.
    Probe,
}

/// What happened in the most recent call cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub cycle: u64,
    pub kind: CycleKind,
    pub outcome: &'static str,
    pub error: Option<String>,
    pub state_after: BreakerState,
    pub latency_ms: u64,
    pub observed_at_unix_ms: u64,
}

impl Observation {
    pub fn new<T>(
        cycle: u64,
        kind: CycleKind,
        outcome: &CallOutcome<T>,
        state_after: BreakerState,
        latency: Duration,
    ) -> Self {
        let observed_at_unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            cycle,
            kind,
            outcome: outcome.label(),
            error: outcome.cause().map(ToString::to_string),
            state_after,
            latency_ms: latency.as_millis() as u64,
            observed_at_unix_ms,
        }
    }
}

/// Shared slot holding the latest observation; written by the loop, read by health.
pub type ObservationSlot = Arc<ArcSwapOption<Observation>>;

pub fn observation_slot() -> ObservationSlot {
    Arc::new(ArcSwapOption::empty())
}
