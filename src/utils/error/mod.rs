//! Error handling utilities
//!
//! This module provides the engine's error taxonomy and the recovery helpers
//! (retry, timeout, panic boundary) used around caller-supplied closures.

pub mod error;
pub mod recovery;

// Re-export commonly used types and functions
pub use error::*;
pub use recovery::*;
