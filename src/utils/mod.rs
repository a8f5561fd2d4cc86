//! Utility modules
//!
//! - **error**: Error type, retry and the timeout/panic boundary
//! - **logging**: Subscriber installation

pub mod error;
pub mod logging;
