//! Resilient client service.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────────┐
//!                 │                    RESILIENT CLIENT                        │
//!                 │                                                            │
//!  GET /call ─────┼─▶ http ──┐                                                 │
//!                 │          ▼                                                 │
//!                 │   ┌──────────────┐   ┌────────────────┐   ┌────────────┐   │
//!                 │   │  resilience  │──▶│ circuit breaker│──▶│ dependency │───┼──▶ /work
//!                 │   │   executor   │   │ + retry policy │   │   client   │   │
//!                 │   └──────────────┘   └────────────────┘   └────────────┘   │
//!                 │          ▲                   │                             │
//!                 │   ┌──────┴───────┐   ┌───────▼────────┐                    │
//!                 │   │ driving loop │   │ health reporter│◀── GET /health ────┼──
//!                 │   └──────────────┘   └────────────────┘                    │
//!                 │                                                            │
//!                 │   config · observability · lifecycle (cross-cutting)       │
//!                 └───────────────────────────────────────────────────────────┘
//! ```

use resilient_client::config;
use resilient_client::lifecycle::{self, signals::wait_for_signal};
use resilient_client::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;
    init_logging(&config.observability)?;

    tracing::info!("resilient-client v{} starting", env!("CARGO_PKG_VERSION"));

    let service = lifecycle::start(config).await?;

    wait_for_signal().await;
    tracing::info!("Shutdown signal received");
    service.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
