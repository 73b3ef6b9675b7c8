//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router (`/`, `/health`, `/call`)
//! - Wire up middleware (tracing, request timeout)
//! - Serve until the shutdown signal fires

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::dependency::{Dependency, DependencyClient};
use crate::health::{HealthReport, HealthReporter};
use crate::http::response::CallResponse;
use crate::resilience::ResilientCallExecutor;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<ResilientCallExecutor>,
    pub dependency: Arc<DependencyClient>,
    pub reporter: HealthReporter,
}

/// HTTP server exposing health and the passthrough call.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// `request_timeout` bounds a whole `/call`, retries included.
    pub fn new(state: AppState, request_timeout: Duration) -> Self {
        Self {
            router: Self::build_router(state, request_timeout),
        }
    }

    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/call", get(call_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Client resilience service running" }))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.reporter.report())
}

/// One guarded call per request.
async fn call_handler(State(state): State<AppState>) -> CallResponse {
    let start = Instant::now();
    let dependency = state.dependency.clone();
    let outcome = state.executor.execute(|| dependency.call()).await;
    let response = CallResponse::from_outcome(outcome, start.elapsed());

    tracing::debug!(
        status = ?response.status,
        latency_ms = response.latency_ms,
        breaker = %state.reporter.state(),
        "Passthrough call finished"
    );
    response
}
