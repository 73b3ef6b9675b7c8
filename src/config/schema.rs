//! Configuration schema definitions.
//!
//! All types derive Serde traits so they can be read from a TOML file and then
//! overridden from the environment (see `loader.rs`). Durations are stored as
//! milliseconds and exposed as `Duration` through accessors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the resilient client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Downstream dependency settings.
    pub dependency: DependencyConfig,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Retry and backoff settings.
    pub retries: RetryConfig,

    /// Background driving loop settings.
    pub driver: DriverConfig,

    /// HTTP listener for the health and passthrough endpoints.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Downstream dependency configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Full URL of the dependency endpoint.
    pub url: String,

    /// Per-attempt network timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl DependencyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            url: "http://backend:8000/work".to_string(),
            request_timeout_ms: 2000,
        }
    }
}

/// Circuit breaker configuration.
///
/// Built once at startup; the breaker keeps its own copy and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures (while closed) that trip the breaker.
    pub failure_threshold: u32,

    /// How long the breaker stays open before a probe is allowed, in milliseconds.
    pub reset_timeout_ms: u64,

    /// Concurrent trial calls admitted while half-open.
    pub half_open_max_probes: u32,
}

impl BreakerConfig {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 2,
            reset_timeout_ms: 1000,
            half_open_max_probes: 1,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Driving loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run the background loop at all.
    pub enabled: bool,

    /// Pause between cycles in milliseconds.
    pub interval_ms: u64,

    /// Re-check cadence while the breaker is open and not yet probe-eligible.
    pub open_poll_interval_ms: u64,
}

impl DriverConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn open_poll_interval(&self) -> Duration {
        Duration::from_millis(self.open_poll_interval_ms)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 300,
            open_poll_interval_ms: 300,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8001".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`.
    pub log_level: String,

    /// `pretty` for human-readable lines, `json` for machine parsing.
    pub log_format: String,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
