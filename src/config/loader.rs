//! Configuration loading: defaults, optional TOML file, then environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "CLIENT_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from the process environment.
///
/// If `CLIENT_CONFIG` names a file it is parsed first; individual variables
/// then override whatever the file (or the defaults) set.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).ok();
    load_config(path.as_deref().map(Path::new), |key| std::env::var(key).ok())
}

/// Load and validate configuration from an optional TOML file plus overrides.
pub fn load_config<F>(path: Option<&Path>, lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ClientConfig::default(),
    };

    apply_env(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment-style overrides.
///
/// Time values (`CB_RESET_TIMEOUT`, `RETRY_BASE`, `RETRY_MAX`, `REQUEST_TIMEOUT`)
/// are given in seconds and may be fractional.
pub fn apply_env<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("BACKEND_URL") {
        config.dependency.url = url;
    }
    if let Some(ms) = secs_var(&lookup, "REQUEST_TIMEOUT")? {
        config.dependency.request_timeout_ms = ms;
    }

    if let Some(n) = parsed_var(&lookup, "CB_FAIL_MAX")? {
        config.breaker.failure_threshold = n;
    }
    if let Some(ms) = secs_var(&lookup, "CB_RESET_TIMEOUT")? {
        config.breaker.reset_timeout_ms = ms;
    }
    if let Some(n) = parsed_var(&lookup, "CB_HALF_OPEN_MAX_CALLS")? {
        config.breaker.half_open_max_probes = n;
    }

    if let Some(n) = parsed_var(&lookup, "RETRY_MAX_ATTEMPTS")? {
        config.retries.max_attempts = n;
    }
    if let Some(ms) = secs_var(&lookup, "RETRY_BASE")? {
        config.retries.base_delay_ms = ms;
    }
    if let Some(ms) = secs_var(&lookup, "RETRY_MAX")? {
        config.retries.max_delay_ms = ms;
    }

    if let Some(enabled) = parsed_var(&lookup, "LOOP_ENABLED")? {
        config.driver.enabled = enabled;
    }
    if let Some(ms) = parsed_var(&lookup, "LOOP_INTERVAL_MS")? {
        config.driver.interval_ms = ms;
    }

    if let Some(addr) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format = format;
    }
    if let Some(enabled) = parsed_var(&lookup, "METRICS_ENABLED")? {
        config.observability.metrics_enabled = enabled;
    }
    if let Some(addr) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = addr;
    }

    Ok(())
}

fn parsed_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(ConfigError::InvalidEnv {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn secs_var<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(secs) = parsed_var::<F, f64>(lookup, key)? else {
        return Ok(None);
    };

    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::InvalidEnv {
            key,
            value: secs.to_string(),
            reason: "expected a non-negative number of seconds".to_string(),
        });
    }

    Ok(Some((secs * 1000.0).round() as u64))
}
