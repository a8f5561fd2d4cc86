//! Per-target status tracked by the monitor

use crate::core::health::{CheckResult, HealthStatus};
use crate::core::repair::RepairResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one monitored check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerStatus {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub total_checks: u64,
    pub total_successes: u64,
    pub total_failures: u64,
    pub last_repair: Option<DateTime<Utc>>,
    pub last_repair_result: Option<RepairResult>,
    /// Error text of the last repair attempt, cleared by a successful one
    pub last_repair_error: Option<String>,
}

impl CheckerStatus {
    /// Initial `Unknown` status
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unknown,
            message: String::new(),
            last_checked: None,
            last_success: None,
            last_failure: None,
            consecutive_successes: 0,
            consecutive_failures: 0,
            total_checks: 0,
            total_successes: 0,
            total_failures: 0,
            last_repair: None,
            last_repair_result: None,
            last_repair_error: None,
        }
    }

    /// Fold one tick's result into the counters
    ///
    /// Only `Healthy` is a success; Degraded, Unhealthy and Unknown all count
    /// as failures.
    pub fn apply(&mut self, result: &CheckResult) {
        self.status = result.status;
        self.message = result.message.clone();
        self.last_checked = Some(result.timestamp);
        self.total_checks += 1;

        if result.is_healthy() {
            self.consecutive_successes += 1;
            self.consecutive_failures = 0;
            self.total_successes += 1;
            self.last_success = Some(result.timestamp);
        } else {
            self.consecutive_failures += 1;
            self.consecutive_successes = 0;
            self.total_failures += 1;
            self.last_failure = Some(result.timestamp);
        }
    }

    /// Record a repair attempt, whatever its outcome
    ///
    /// `result` is `None` when the strategy declined or never got to run.
    pub fn record_repair(
        &mut self,
        at: DateTime<Utc>,
        result: Option<RepairResult>,
        error: Option<String>,
    ) {
        self.last_repair = Some(at);
        self.last_repair_result = result;
        self.last_repair_error = error;
    }
}
