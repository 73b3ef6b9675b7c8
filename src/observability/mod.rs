//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience + driver produce:
//!     → logging.rs (structured events: breaker transitions, retry delays, cycles)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines) for offline transition/retry analysis
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every breaker transition is one `warn` event with `from`/`to` fields
//! - Every retry is one `info` event carrying the computed delay
//! - Each executed call runs inside a span carrying its `call_id`

pub mod logging;
pub mod metrics;
