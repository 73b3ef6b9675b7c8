//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file named by CLIENT_CONFIG (loader.rs)
//!     → environment overrides: BACKEND_URL, CB_*, RETRY_*, ... (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → breaker/retry configs copied into the components that own them
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow an empty environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    BreakerConfig, ClientConfig, DependencyConfig, DriverConfig, ListenerConfig,
    ObservabilityConfig, RetryConfig,
};
pub use validation::ValidationError;
