//! Fault-injecting dependency used for demos and end-to-end tests.
//!
//! `GET /work` optionally sleeps up to `max_delay_ms` (with probability
//! `slow_rate`), then optionally answers 500 (with probability `failure_rate`),
//! otherwise returns `{"ok": true, "ts": <unix seconds>}`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::loader::ConfigError;

/// Fault injection knobs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Probability of answering 500.
    pub failure_rate: f64,
    /// Probability of adding latency.
    pub slow_rate: f64,
    /// Upper bound of injected latency in milliseconds.
    pub max_delay_ms: u64,
    pub bind_address: String,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.2,
            slow_rate: 0.3,
            max_delay_ms: 800,
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

impl ChaosConfig {
    /// Read `FAILURE_RATE`, `SLOW_RATE`, `MAX_DELAY_MS` and `BIND_ADDRESS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(rate) = probability(&lookup, "FAILURE_RATE")? {
            config.failure_rate = rate;
        }
        if let Some(rate) = probability(&lookup, "SLOW_RATE")? {
            config.slow_rate = rate;
        }
        if let Some(value) = lookup("MAX_DELAY_MS") {
            config.max_delay_ms = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    key: "MAX_DELAY_MS",
                    reason: e.to_string(),
                    value: value.clone(),
                }
            })?;
        }
        if let Some(addr) = lookup("BIND_ADDRESS") {
            config.bind_address = addr;
        }
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn probability<F>(lookup: &F, key: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => Ok(Some(p)),
        Ok(_) => Err(ConfigError::InvalidEnv {
            key,
            value,
            reason: "expected a probability in [0, 1]".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidEnv {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

/// Router serving the chaos endpoint.
pub fn router(config: ChaosConfig) -> Router {
    Router::new()
        .route("/work", get(work_handler))
        .with_state(Arc::new(config))
}

async fn work_handler(State(config): State<Arc<ChaosConfig>>) -> Response {
    if fastrand::f64() < config.slow_rate {
        let delay = Duration::from_millis(fastrand::u64(0..=config.max_delay_ms));
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Injecting latency");
        tokio::time::sleep(delay).await;
    }

    if fastrand::f64() < config.failure_rate {
        tracing::debug!("Injecting failure");
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend error").into_response();
    }

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    Json(json!({ "ok": true, "ts": ts })).into_response()
}
