//! Logging setup
//!
//! Installs a global `tracing` subscriber. `RUST_LOG` wins over the level
//! passed in so individual modules can be turned up without a rebuild.


use crate::utils::error::{HealthError, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a level is given
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter from `RUST_LOG`, falling back to `level`
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = level.unwrap_or(DEFAULT_LOG_LEVEL);
    EnvFilter::try_new(level)
        .map_err(|e| HealthError::Config(format!("Invalid log level '{}': {}", level, e)))
}

/// Install the global subscriber
///
/// `json` switches to one JSON object per line for log shippers.
pub fn init_logging(level: Option<&str>, json: bool) -> Result<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| HealthError::Internal(format!("Failed to install logger: {}", e)))
}
