//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to dependency:
//!     → circuit_breaker.rs (allow: fast-fail when open, admit probe when due)
//!     → executor.rs (attempt loop)
//!         → timeouts.rs (per-attempt deadline)
//!         → retries.rs (classify; on transient failure sleep backoff.rs delay)
//!     → circuit_breaker.rs (record exactly one outcome)
//!     → CallOutcome (outcome.rs) back to the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Transient vs permanent is data (`AttemptError::is_transient`), not control flow
//! - Retries are invisible to the breaker; it sees one outcome per call
//! - Breaker state is process-local and shared via `Arc`

pub mod backoff;
pub mod circuit_breaker;
pub mod executor;
pub mod outcome;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{BreakerPermit, BreakerSnapshot, BreakerState, CircuitBreaker};
pub use executor::ResilientCallExecutor;
pub use outcome::{AttemptError, CallOutcome};
pub use retries::RetryPolicy;
