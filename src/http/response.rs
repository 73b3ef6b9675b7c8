//! Response shape of the passthrough call endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::resilience::CallOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Success,
    CircuitOpen,
    Error,
}

/// Body returned by `GET /call`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResponse {
    pub status: CallStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `transient` or `permanent` for failed calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl CallResponse {
    pub fn from_outcome(outcome: CallOutcome<Value>, latency: Duration) -> Self {
        let latency_ms = latency.as_millis() as u64;
        let (status, payload, error, kind) = match outcome {
            CallOutcome::Success(payload) => (CallStatus::Success, Some(payload), None, None),
            CallOutcome::TransientFailure(e) => {
                (CallStatus::Error, None, Some(e.to_string()), Some("transient"))
            }
            CallOutcome::PermanentFailure(e) => {
                (CallStatus::Error, None, Some(e.to_string()), Some("permanent"))
            }
            CallOutcome::BreakerOpen => (
                CallStatus::CircuitOpen,
                None,
                Some("circuit breaker open".to_string()),
                None,
            ),
        };

        Self {
            status,
            latency_ms,
            payload,
            error,
            kind,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.status {
            CallStatus::Success => StatusCode::OK,
            CallStatus::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
            CallStatus::Error => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for CallResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
