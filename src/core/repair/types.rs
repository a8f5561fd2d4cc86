//! Repair records and statistics

use crate::core::health::Check;
use crate::core::health::types::serde_millis;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use uuid::Uuid;

/// Identity of the check a repair was run for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairTarget {
    pub name: String,
    pub check_type: String,
    pub component: String,
}

impl RepairTarget {
    pub fn new(
        name: impl Into<String>,
        check_type: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            check_type: check_type.into(),
            component: component.into(),
        }
    }

    pub fn of(check: &dyn Check) -> Self {
        Self::new(check.name(), check.check_type(), check.component())
    }
}

/// Outcome of one repair attempt, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairResult {
    pub id: Uuid,
    pub check_name: String,
    pub check_type: String,
    pub component: String,
    pub action_name: String,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(with = "serde_millis")]
    pub duration: Duration,
}

impl RepairResult {
    /// Build the record for an action outcome
    pub fn from_outcome(
        target: &RepairTarget,
        action_name: &str,
        start_time: DateTime<Utc>,
        duration: Duration,
        outcome: &Result<()>,
    ) -> Self {
        let (success, message, error) = match outcome {
            Ok(()) => (
                true,
                format!("{} repaired by {}", target.name, action_name),
                None,
            ),
            Err(e) => (
                false,
                format!("{} could not be repaired by {}", target.name, action_name),
                Some(e.to_string()),
            ),
        };
        let end_time = start_time
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());

        Self {
            id: Uuid::new_v4(),
            check_name: target.name.clone(),
            check_type: target.check_type.clone(),
            component: target.component.clone(),
            action_name: action_name.to_string(),
            success,
            message,
            error,
            start_time,
            end_time,
            duration,
        }
    }
}

/// Bounded per-check repair history
///
/// `results` is capped (oldest evicted first); the counters are cumulative
/// and survive eviction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealHistory {
    pub check_name: String,
    pub check_type: String,
    pub component: String,
    pub results: VecDeque<RepairResult>,
    pub total_heals: u64,
    pub success_heals: u64,
    pub failed_heals: u64,
    pub last_heal_time: Option<DateTime<Utc>>,
    pub last_result: Option<RepairResult>,
}

impl HealHistory {
    pub fn new(check_name: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, result: RepairResult, limit: usize) {
        self.check_type = result.check_type.clone();
        self.component = result.component.clone();
        self.total_heals += 1;
        if result.success {
            self.success_heals += 1;
        } else {
            self.failed_heals += 1;
        }
        self.last_heal_time = Some(result.end_time);
        self.last_result = Some(result.clone());
        self.results.push_back(result);
        self.trim(limit);
    }

    pub(crate) fn trim(&mut self, limit: usize) {
        while self.results.len() > limit {
            self.results.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Fraction of successful heals, 0 when nothing was recorded
    pub fn success_rate(&self) -> f64 {
        rate(self.success_heals, self.total_heals)
    }
}

/// Heal counters for one slice of the history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealCounts {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
}

impl HealCounts {
    fn add(&mut self, history: &HealHistory) {
        self.total += history.total_heals;
        self.success += history.success_heals;
        self.failed += history.failed_heals;
        self.success_rate = rate(self.success, self.total);
    }
}

/// Aggregate repair statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealStats {
    pub total_heals: u64,
    pub success_heals: u64,
    pub failed_heals: u64,
    pub success_rate: f64,
    pub by_component: HashMap<String, HealCounts>,
    pub by_type: HashMap<String, HealCounts>,
}

impl HealStats {
    pub(crate) fn from_histories<'a>(histories: impl Iterator<Item = &'a HealHistory>) -> Self {
        let mut stats = Self::default();
        for history in histories {
            stats.total_heals += history.total_heals;
            stats.success_heals += history.success_heals;
            stats.failed_heals += history.failed_heals;
            stats
                .by_component
                .entry(history.component.clone())
                .or_default()
                .add(history);
            stats
                .by_type
                .entry(history.check_type.clone())
                .or_default()
                .add(history);
        }
        stats.success_rate = rate(stats.success_heals, stats.total_heals);
        stats
    }
}

fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
