//! Error handling for the health engine
//!
//! This module defines all error types used throughout the engine.

mod helpers;
mod types;

pub use types::{HealthError, Result};
