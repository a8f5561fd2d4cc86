//! Resilience patterns: timeout protection and the panic boundary
//!
//! Check and repair closures are supplied by callers, so every invocation goes
//! through [`run_bounded`]: a panic becomes [`HealthError::Panicked`] and an
//! overrun becomes [`HealthError::Timeout`] instead of tearing down the task.

use crate::utils::error::{HealthError, Result};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Timeout wrapper for async operations
///
/// A zero timeout means "unbounded".
#[derive(Debug, Clone, Copy)]
pub struct TimeoutWrapper {
    timeout: Duration,
}

impl TimeoutWrapper {
    /// Create a new timeout wrapper
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Configured bound
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a future with timeout protection
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: std::future::Future<Output = R>,
    {
        if self.timeout.is_zero() {
            return Ok(f.await);
        }

        match tokio::time::timeout(self.timeout, f).await {
            Ok(result) => Ok(result),
            Err(_) => Err(HealthError::Timeout(format!(
                "Operation timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// Run a future, converting a panic inside it into an error
pub async fn catch_panic<F, R>(f: F) -> Result<R>
where
    F: std::future::Future<Output = R>,
{
    AssertUnwindSafe(f)
        .catch_unwind()
        .await
        .map_err(|payload| HealthError::Panicked(panic_message(payload.as_ref())))
}

/// Run a fallible future under both the panic boundary and a timeout
pub async fn run_bounded<F, R>(timeout: Duration, f: F) -> Result<R>
where
    F: std::future::Future<Output = Result<R>>,
{
    TimeoutWrapper::new(timeout).call(catch_panic(f)).await??
}

/// Extract a printable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
