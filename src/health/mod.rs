//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → reporter.rs
//!         → CircuitBreaker::snapshot (short lock, copy only)
//!         → CircuitBreaker::time_until_probe_eligible
//!         → latest driving-loop observation (lock-free load)
//!     → HealthReport (JSON)
//! ```
//!
//! # Design Decisions
//! - Reads never transition the breaker, even when a probe is due
//! - Configuration is reported as loaded; it cannot change at runtime

pub mod reporter;

pub use reporter::{HealthReport, HealthReporter};
