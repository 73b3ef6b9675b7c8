//! Configuration validation.
//!
//! Serde handles the syntax; this module checks value ranges and returns every
//! problem at once rather than stopping at the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.dependency.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "dependency.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("dependency.url", e.to_string())),
    }

    if config.dependency.request_timeout_ms == 0 {
        errors.push(ValidationError::new("dependency.request_timeout_ms", "must be greater than 0"));
    }
    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError::new("breaker.failure_threshold", "must be at least 1"));
    }
    if config.breaker.reset_timeout_ms == 0 {
        errors.push(ValidationError::new("breaker.reset_timeout_ms", "must be greater than 0"));
    }
    if config.breaker.half_open_max_probes == 0 {
        errors.push(ValidationError::new("breaker.half_open_max_probes", "must be at least 1"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.driver.interval_ms == 0 {
        errors.push(ValidationError::new("driver.interval_ms", "must be greater than 0"));
    }
    if config.driver.open_poll_interval_ms == 0 {
        errors.push(ValidationError::new("driver.open_poll_interval_ms", "must be greater than 0"));
    }
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected 'pretty' or 'json', got '{}'", config.observability.log_format),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
