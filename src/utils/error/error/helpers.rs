//! Helper functions for creating and inspecting specific error types

use super::types::HealthError;
use crate::core::health::CheckResult;
use crate::core::repair::RepairResult;

/// Helper functions for creating specific errors
impl HealthError {
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound(name.into())
    }

    pub fn already_exists<S: Into<String>>(name: S) -> Self {
        Self::AlreadyExists(name.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn check<S: Into<String>>(message: S) -> Self {
        Self::Check(message.into())
    }

    pub fn action<S: Into<String>>(message: S) -> Self {
        Self::Action(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap an action failure together with the result that was recorded for it
    pub fn repair_failed(result: RepairResult, source: HealthError) -> Self {
        Self::RepairFailed {
            result: Box::new(result),
            check_result: None,
            source: Box::new(source),
        }
    }

    /// Attach the post-repair verdict to a `RepairFailed`; other errors pass through
    pub fn with_check_result(self, fresh: CheckResult) -> Self {
        match self {
            Self::RepairFailed { result, source, .. } => Self::RepairFailed {
                result,
                check_result: Some(Box::new(fresh)),
                source,
            },
            other => other,
        }
    }
}

/// Inspection helpers
impl HealthError {
    pub fn is_already_healing(&self) -> bool {
        matches!(self, Self::AlreadyHealing(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::RepairFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// The repair result attached to a failed repair, if any
    pub fn repair_result(&self) -> Option<&RepairResult> {
        match self {
            Self::RepairFailed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// The check verdict taken after a failed repair, if one was taken
    pub fn check_result(&self) -> Option<&CheckResult> {
        match self {
            Self::RepairFailed { check_result, .. } => check_result.as_deref(),
            _ => None,
        }
    }
}
