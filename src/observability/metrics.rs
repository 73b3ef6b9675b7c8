//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resilient_client_breaker_transitions_total` (counter): by `from`, `to`
//! - `resilient_client_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `resilient_client_rejections_total` (counter): calls fast-failed by the breaker
//! - `resilient_client_retries_total` (counter): backoff sleeps taken
//! - `resilient_client_calls_total` (counter): terminal outcomes by `outcome`
//! - `resilient_client_call_duration_seconds` (histogram): latency per admitted call
//!
//! Recording is a no-op until a recorder is installed, so library code and tests
//! can call these freely.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

use crate::resilience::circuit_breaker::BreakerState;

/// Install the Prometheus recorder with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_transition(from: BreakerState, to: BreakerState) {
    counter!(
        "resilient_client_breaker_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    gauge!("resilient_client_breaker_state").set(to.as_gauge());
}

pub fn record_rejection() {
    counter!("resilient_client_rejections_total").increment(1);
}

pub fn record_retry() {
    counter!("resilient_client_retries_total").increment(1);
}

pub fn record_call(outcome: &'static str, elapsed: Duration) {
    counter!("resilient_client_calls_total", "outcome" => outcome).increment(1);
    histogram!("resilient_client_call_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
