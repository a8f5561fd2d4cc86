//! Environment overrides
//!
//! `SELFHEAL_*` variables take precedence over values read from the file.

use super::EngineConfig;
use crate::core::monitor::TriggerMode;
use crate::utils::error::{HealthError, Result};
use std::str::FromStr;
use tracing::debug;

pub const ENV_CHECK_INTERVAL_SECS: &str = "SELFHEAL_CHECK_INTERVAL_SECS";
pub const ENV_INITIAL_DELAY_SECS: &str = "SELFHEAL_INITIAL_DELAY_SECS";
pub const ENV_AUTO_REPAIR: &str = "SELFHEAL_AUTO_REPAIR";
pub const ENV_FAILURE_THRESHOLD: &str = "SELFHEAL_FAILURE_THRESHOLD";
pub const ENV_SUCCESS_THRESHOLD: &str = "SELFHEAL_SUCCESS_THRESHOLD";
pub const ENV_TRIGGER: &str = "SELFHEAL_TRIGGER";
pub const ENV_HISTORY_LIMIT: &str = "SELFHEAL_HISTORY_LIMIT";

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HealthError::Config(format!("Invalid value for {}: '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HealthError::Config(format!(
            "Invalid value for {}: '{}'",
            key, value
        ))),
    }
}

impl EngineConfig {
    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CHECK_INTERVAL_SECS) {
            self.monitor.check_interval_secs = parse_var(ENV_CHECK_INTERVAL_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_INITIAL_DELAY_SECS) {
            self.monitor.initial_delay_secs = parse_var(ENV_INITIAL_DELAY_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_AUTO_REPAIR) {
            self.monitor.auto_repair = parse_bool(ENV_AUTO_REPAIR, &value)?;
        }
        if let Some(value) = lookup(ENV_FAILURE_THRESHOLD) {
            self.monitor.failure_threshold = parse_var(ENV_FAILURE_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_SUCCESS_THRESHOLD) {
            self.monitor.success_threshold = parse_var(ENV_SUCCESS_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_TRIGGER) {
            self.monitor.trigger = TriggerMode::from_str(&value)?;
        }
        if let Some(value) = lookup(ENV_HISTORY_LIMIT) {
            self.healer.history_limit = parse_var(ENV_HISTORY_LIMIT, &value)?;
        }

        debug!("Environment overrides applied");
        Ok(())
    }
}
