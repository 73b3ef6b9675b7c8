//! Downstream dependency abstraction.
//!
//! The executor only needs "one attempt" as a future; `Dependency` names that
//! seam so the driving loop and the HTTP passthrough can share a client, and so
//! tests can substitute a counting stub.

pub mod client;

use serde_json::Value;
use std::future::Future;

use crate::resilience::AttemptError;

pub use client::DependencyClient;

/// One unit of work against the dependency.
pub trait Dependency: Send + Sync + 'static {
    fn call(&self) -> impl Future<Output = Result<Value, AttemptError>> + Send;
}
