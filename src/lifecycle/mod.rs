//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build breaker/policy/executor/client → Spawn driving loop → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Loop and server stop at next await → Join tasks
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, RunningService, StartupError};
