//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared breaker, policy, executor, client, and reporter from config
//! - Start background tasks (metrics exporter, driving loop)
//! - Bind the listener last, so traffic arrives only when everything is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Metrics exporter problems are logged, not fatal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{ClientConfig, ConfigError};
use crate::dependency::DependencyClient;
use crate::driver::DrivingLoop;
use crate::health::HealthReporter;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::{CircuitBreaker, ResilientCallExecutor, RetryPolicy};

/// Unrecoverable startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build dependency client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything built from configuration, before any task is spawned.
pub struct Components {
    pub breaker: Arc<CircuitBreaker>,
    pub executor: Arc<ResilientCallExecutor>,
    pub dependency: Arc<DependencyClient>,
    pub reporter: HealthReporter,
    pub driver: Option<DrivingLoop<DependencyClient>>,
}

/// Build components in dependency order.
pub fn build(config: &ClientConfig) -> Result<Components, StartupError> {
    let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
    let policy = RetryPolicy::new(config.retries.clone());
    let executor = Arc::new(ResilientCallExecutor::new(
        breaker.clone(),
        policy,
        config.dependency.request_timeout(),
    ));
    let dependency = Arc::new(DependencyClient::new(&config.dependency)?);

    let mut reporter = HealthReporter::new(breaker.clone(), config.retries.clone());
    let driver = if config.driver.enabled {
        let driver = DrivingLoop::new(executor.clone(), dependency.clone(), config.driver.clone());
        reporter = reporter.with_observations(driver.observations());
        Some(driver)
    } else {
        tracing::info!("Driving loop disabled");
        None
    };

    Ok(Components {
        breaker,
        executor,
        dependency,
        reporter,
        driver,
    })
}

/// Upper bound for one `/call`: every attempt timing out plus every maximal backoff.
pub fn call_budget(config: &ClientConfig) -> Duration {
    let attempts = config.retries.max_attempts.max(1);
    config.dependency.request_timeout() * attempts
        + config.retries.max_delay() * (attempts - 1)
        + Duration::from_secs(1)
}

/// Handles to the running service.
pub struct RunningService {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    server: JoinHandle<Result<(), std::io::Error>>,
    driver: Option<JoinHandle<()>>,
}

impl RunningService {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Trigger shutdown and wait for every task to finish.
    pub async fn shutdown(self) {
        self.shutdown.trigger();

        if let Some(driver) = self.driver {
            if let Err(e) = driver.await {
                tracing::error!(error = %e, "Driving loop task failed");
            }
        }
        match self.server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "HTTP server exited with error"),
            Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
        }
    }
}

/// Start the service described by `config`.
pub async fn start(config: ClientConfig) -> Result<RunningService, StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to install metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let components = build(&config)?;
    tracing::info!(
        dependency = %components.dependency.url(),
        failure_threshold = config.breaker.failure_threshold,
        reset_timeout_ms = config.breaker.reset_timeout_ms,
        half_open_max_probes = config.breaker.half_open_max_probes,
        max_attempts = config.retries.max_attempts,
        base_delay_ms = config.retries.base_delay_ms,
        max_delay_ms = config.retries.max_delay_ms,
        request_timeout_ms = config.dependency.request_timeout_ms,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let driver = components
        .driver
        .map(|driver| driver.spawn(shutdown.subscribe()));

    let address = config.listener.bind_address.clone();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(source) => {
            shutdown.trigger();
            return Err(StartupError::Bind { address, source });
        }
    };
    let local_addr = listener
        .local_addr()
        .map_err(|source| StartupError::Bind { address, source })?;

    let state = AppState {
        executor: components.executor,
        dependency: components.dependency,
        reporter: components.reporter,
    };
    let server = HttpServer::new(state, call_budget(&config));
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tracing::info!(address = %local_addr, "Listening for connections");

    Ok(RunningService {
        local_addr,
        shutdown,
        server,
        driver,
    })
}
