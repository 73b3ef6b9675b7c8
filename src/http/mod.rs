//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! GET /health → server.rs → HealthReporter::report → JSON
//! GET /call   → server.rs → ResilientCallExecutor::execute → response.rs → JSON + status
//! ```

pub mod response;
pub mod server;

pub use response::{CallResponse, CallStatus};
pub use server::{AppState, HttpServer};
