//! Error recovery and resilience utilities
//!
//! This module provides retry with backoff, timeout protection and the panic
//! boundary used around every check and repair closure.

mod resilience;
mod retry;
mod types;

pub use resilience::{TimeoutWrapper, catch_panic, panic_message, run_bounded};
pub use retry::RetryPolicy;
pub use types::RetryConfig;
