//! Read-only view of breaker state and active configuration.

use serde::Serialize;
use std::sync::Arc;

use crate::config::{BreakerConfig, RetryConfig};
use crate::driver::{Observation, ObservationSlot};
use crate::resilience::{BreakerState, CircuitBreaker};

/// Health payload served at `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub breaker_state: BreakerState,
    pub breaker: BreakerRuntimeReport,
    pub config: ActiveConfig,
    pub last_cycle: Option<Observation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerRuntimeReport {
    pub consecutive_failures: u32,
    pub probes_in_flight: u32,
    pub open_for_ms: Option<u64>,
    pub probe_eligible_in_ms: Option<u64>,
    pub transitions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveConfig {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
    pub half_open_max_probes: u32,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl ActiveConfig {
    fn new(breaker: &BreakerConfig, retries: &RetryConfig) -> Self {
        Self {
            failure_threshold: breaker.failure_threshold,
            reset_timeout_ms: breaker.reset_timeout_ms,
            half_open_max_probes: breaker.half_open_max_probes,
            max_attempts: retries.max_attempts,
            base_delay_ms: retries.base_delay_ms,
            max_delay_ms: retries.max_delay_ms,
        }
    }
}

/// Snapshots breaker state for observers. Holds no mutation capability.
#[derive(Debug, Clone)]
pub struct HealthReporter {
    breaker: Arc<CircuitBreaker>,
    retries: RetryConfig,
    observations: Option<ObservationSlot>,
}

impl HealthReporter {
    pub fn new(breaker: Arc<CircuitBreaker>, retries: RetryConfig) -> Self {
        Self {
            breaker,
            retries,
            observations: None,
        }
    }

    /// Include the driving loop's latest observation in reports.
    pub fn with_observations(mut self, observations: ObservationSlot) -> Self {
        self.observations = Some(observations);
        self
    }

    pub fn state(&self) -> BreakerState {
        self.breaker.state()
    }

    pub fn report(&self) -> HealthReport {
        let snapshot = self.breaker.snapshot();
        let probe_eligible_in = self.breaker.time_until_probe_eligible();

        HealthReport {
            breaker_state: snapshot.state,
            breaker: BreakerRuntimeReport {
                consecutive_failures: snapshot.consecutive_failures,
                probes_in_flight: snapshot.probes_in_flight,
                open_for_ms: snapshot.open_for.map(|d| d.as_millis() as u64),
                probe_eligible_in_ms: probe_eligible_in.map(|d| d.as_millis() as u64),
                transitions: snapshot.transitions,
            },
            config: ActiveConfig::new(self.breaker.config(), &self.retries),
            last_cycle: self
                .observations
                .as_ref()
                .and_then(|slot| slot.load_full())
                .map(|observation| (*observation).clone()),
        }
    }
}
