//! Resilient client: circuit breaker + jittered retries around a flaky dependency.

pub mod chaos;
pub mod config;
pub mod dependency;
pub mod driver;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ClientConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{CallOutcome, CircuitBreaker, ResilientCallExecutor, RetryPolicy};
