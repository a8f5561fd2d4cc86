//! Health status types and check results
//!
//! This module defines the core value types of the engine: the four-level
//! health status and the immutable result produced by every evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Health status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Target is fully operational
    Healthy,
    /// Target is operational but degraded
    Degraded,
    /// Target is failing
    Unhealthy,
    /// No verdict yet, or the check could not decide
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Whether this status counts as a success tick
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one health evaluation
///
/// Produced fresh on every run and never mutated afterwards except by the
/// registry, which stamps timing and provenance before handing it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Verdict
    pub status: HealthStatus,
    /// Human readable summary
    pub message: String,
    /// Diagnostic payload
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
    /// When the evaluation finished
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// How long the evaluation took
    #[serde(with = "serde_millis")]
    pub duration: Duration,
    /// Name of the producing check
    #[serde(default)]
    pub check_name: String,
    /// Type tag of the producing check
    #[serde(default)]
    pub check_type: String,
    /// Owning component of the producing check
    #[serde(default)]
    pub component: String,
    /// Error text when the evaluation itself failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// Create a result with the given status and message
    pub fn new(status: HealthStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: HashMap::new(),
            timestamp: chrono::Utc::now(),
            duration: Duration::ZERO,
            check_name: String::new(),
            check_type: String::new(),
            component: String::new(),
            error: None,
        }
    }

    /// Create a healthy result
    pub fn healthy(message: impl Into<String>) -> Self {
        Self::new(HealthStatus::Healthy, message)
    }

    /// Create a degraded result
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(HealthStatus::Degraded, message)
    }

    /// Create an unhealthy result
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(HealthStatus::Unhealthy, message)
    }

    /// Create an unknown result
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(HealthStatus::Unknown, message)
    }

    /// Attach one diagnostic value
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attach an error description
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// Serialize a `Duration` as whole milliseconds
pub(crate) mod serde_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
