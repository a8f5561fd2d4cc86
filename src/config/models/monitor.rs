//! Monitor settings

use super::*;
use crate::core::monitor::{MonitorConfig, TriggerMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monitor section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_true")]
    pub auto_repair: bool,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    #[serde(default)]
    pub trigger: TriggerMode,
    /// Use each check's thresholds instead of the two above
    #[serde(default)]
    pub per_check_thresholds: bool,
    #[serde(default = "default_status_history_limit")]
    pub status_history_limit: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            initial_delay_secs: default_initial_delay_secs(),
            auto_repair: true,
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            trigger: TriggerMode::default(),
            per_check_thresholds: false,
            status_history_limit: default_status_history_limit(),
        }
    }
}

impl MonitorSettings {
    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            check_interval: Duration::from_secs(self.check_interval_secs),
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            auto_repair: self.auto_repair,
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            trigger_mode: self.trigger,
            per_check_thresholds: self.per_check_thresholds,
            status_history_limit: self.status_history_limit,
        }
    }
}
