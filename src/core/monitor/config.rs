//! Monitor configuration

use crate::utils::error::HealthError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// When auto-repair fires once the failure threshold is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Every tick while `consecutive_failures >= failure_threshold`
    #[default]
    Level,
    /// Once per incident, re-armed after `success_threshold` healthy ticks
    Edge,
}

impl FromStr for TriggerMode {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "level" => Ok(TriggerMode::Level),
            "edge" => Ok(TriggerMode::Edge),
            other => Err(HealthError::config(format!(
                "unknown trigger mode '{}', expected 'level' or 'edge'",
                other
            ))),
        }
    }
}

/// Health monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between ticks of one target
    pub check_interval: Duration,
    /// Delay before the first tick
    pub initial_delay: Duration,
    /// Whether to call the healer when the failure threshold is reached
    pub auto_repair: bool,
    /// Consecutive failures before auto-repair
    pub failure_threshold: u32,
    /// Consecutive successes before a target counts as recovered
    pub success_threshold: u32,
    pub trigger_mode: TriggerMode,
    /// Use each check's own thresholds instead of the two above
    pub per_check_thresholds: bool,
    /// Results kept per target
    pub status_history_limit: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            initial_delay: Duration::from_secs(5),
            auto_repair: true,
            failure_threshold: 3,
            success_threshold: 1,
            trigger_mode: TriggerMode::Level,
            per_check_thresholds: false,
            status_history_limit: 100,
        }
    }
}
