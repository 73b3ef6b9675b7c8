//! Background task that keeps the guarded call path exercised.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::config::DriverConfig;
use crate::dependency::Dependency;
use crate::driver::observation::{observation_slot, CycleKind, Observation, ObservationSlot};
use crate::resilience::{BreakerState, ResilientCallExecutor};

/// Repeatedly calls the dependency through the executor and forces probes
/// as soon as an open breaker becomes eligible.
pub struct DrivingLoop<D> {
    executor: Arc<ResilientCallExecutor>,
    dependency: Arc<D>,
    config: DriverConfig,
    latest: ObservationSlot,
    cycles: u64,
    last_state: Option<BreakerState>,
}

impl<D: Dependency> DrivingLoop<D> {
    pub fn new(executor: Arc<ResilientCallExecutor>, dependency: Arc<D>, config: DriverConfig) -> Self {
        Self {
            executor,
            dependency,
            config,
            latest: observation_slot(),
            cycles: 0,
            last_state: None,
        }
    }

    /// Handle to the slot this loop publishes into.
    pub fn observations(&self) -> ObservationSlot {
        self.latest.clone()
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Run until the shutdown signal fires (or its sender is dropped).
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.config.interval_ms,
            open_poll_interval_ms = self.config.open_poll_interval_ms,
            "Driving loop starting"
        );

        loop {
            let pause = tokio::select! {
                pause = self.cycle() => pause,
                _ = shutdown.recv() => break,
            };

            tokio::select! {
                _ = sleep(pause) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!(cycles = self.cycles, "Driving loop received shutdown signal, exiting");
    }

    /// Run one cycle and return how long to pause before the next.
    pub async fn cycle(&mut self) -> Duration {
        let breaker = self.executor.breaker().clone();

        let state = breaker.state();
        if self.last_state != Some(state) {
            tracing::warn!(state = %state, "Breaker state changed → {}", state);
            self.last_state = Some(state);
        }

        let kind = match breaker.time_until_probe_eligible() {
            Some(remaining) if !remaining.is_zero() => {
                let reset = breaker.config().reset_timeout();
                tracing::info!(
                    elapsed_ms = reset.saturating_sub(remaining).as_millis() as u64,
                    reset_timeout_ms = reset.as_millis() as u64,
                    "Breaker still OPEN"
                );
                return remaining.min(self.config.open_poll_interval());
            }
            Some(_) => {
                tracing::warn!("Breaker reset timeout elapsed, forcing HALF_OPEN probe");
                CycleKind::Probe
            }
            None => CycleKind::Normal,
        };

        self.cycles += 1;
        let start = Instant::now();
        let dependency = &self.dependency;
        let outcome = self.executor.execute(|| dependency.call()).await;
        let state_after = breaker.state();

        let observation = Observation::new(self.cycles, kind, &outcome, state_after, start.elapsed());
        tracing::info!(
            cycle = observation.cycle,
            kind = ?observation.kind,
            outcome = observation.outcome,
            breaker = %state_after,
            latency_ms = observation.latency_ms,
            "Cycle complete"
        );
        self.latest.store(Some(Arc::new(observation)));

        self.config.interval()
    }
}
