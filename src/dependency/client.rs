//! HTTP client for the downstream dependency.
//!
//! # Responsibilities
//! - Issue one GET per attempt against the configured URL
//! - Translate transport errors and statuses into `AttemptError`
//! - Decode the JSON payload of successful responses

use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::config::DependencyConfig;
use crate::dependency::Dependency;
use crate::resilience::AttemptError;

/// Longest slice of an error body kept in `AttemptError::ServerError`.
const MAX_ERROR_BODY: usize = 256;

/// Dependency reached over HTTP.
#[derive(Debug, Clone)]
pub struct DependencyClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl DependencyClient {
    pub fn new(config: &DependencyConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Value, AttemptError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_server_error() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            return Err(AttemptError::ServerError {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(AttemptError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| AttemptError::MalformedResponse(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> AttemptError {
        if e.is_timeout() {
            AttemptError::Timeout(self.timeout)
        } else {
            AttemptError::Transport(e.to_string())
        }
    }
}

impl Dependency for DependencyClient {
    fn call(&self) -> impl Future<Output = Result<Value, AttemptError>> + Send {
        self.fetch()
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
