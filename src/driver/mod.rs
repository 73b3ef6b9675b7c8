//! Driving loop subsystem.
//!
//! # Data Flow
//! ```text
//! every cycle:
//!     breaker OPEN, timeout pending → sleep min(remaining, open_poll_interval)
//!     breaker OPEN, timeout elapsed → one probe call via executor
//!     otherwise                     → one normal call via executor
//!     → observation.rs (publish outcome + breaker state)
//!     → sleep interval (interruptible by shutdown)
//! ```
//!
//! # Design Decisions
//! - Sequential: one call in flight from the loop's point of view
//! - Probe eligibility comes from `time_until_probe_eligible`, never breaker internals
//! - Errors are observations, not loop exits; only shutdown ends the task

pub mod observation;
pub mod worker;

pub use observation::{CycleKind, Observation, ObservationSlot};
pub use worker::DrivingLoop;
