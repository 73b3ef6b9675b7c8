//! Fault-injecting dependency for exercising the resilient client.

use resilient_client::chaos::{self, ChaosConfig};
use resilient_client::lifecycle::signals::wait_for_signal;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chaos_backend=info,resilient_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ChaosConfig::from_env()?;
    tracing::info!(
        failure_rate = config.failure_rate,
        slow_rate = config.slow_rate,
        max_delay_ms = config.max_delay_ms,
        "chaos-backend starting"
    );

    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, chaos::router(config))
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
