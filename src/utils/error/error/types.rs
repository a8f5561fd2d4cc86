//! Error types for the health engine

use crate::core::health::CheckResult;
use crate::core::repair::RepairResult;
use thiserror::Error;

/// Result type alias for the health engine
pub type Result<T> = std::result::Result<T, HealthError>;

/// Main error type for the health engine
#[derive(Error, Debug)]
pub enum HealthError {
    /// A check with the same name is already registered
    #[error("Health check already exists: {0}")]
    AlreadyExists(String),

    /// The named check (or strategy, or status entry) is absent
    #[error("Health check not found: {0}")]
    NotFound(String),

    /// Repair requested on a check that cannot recover
    #[error("Health check is not recoverable: {0}")]
    NotRecoverable(String),

    /// A repair for the same check is already in flight
    #[error("Health check is already being healed: {0}")]
    AlreadyHealing(String),

    /// Evaluation or repair exceeded its time bound
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// No strategy is bound to the check
    #[error("No repair strategy for {0}")]
    NoStrategy(String),

    /// The bound strategy selected no action
    #[error("No repair action for {0}")]
    NoAction(String),

    /// The repair action ran and failed; the recorded result travels with the error
    #[error("Repair of {} via {} failed: {source}", .result.check_name, .result.action_name)]
    RepairFailed {
        result: Box<RepairResult>,
        /// Verdict of the check re-run after the failed attempt
        check_result: Option<Box<CheckResult>>,
        #[source]
        source: Box<HealthError>,
    },

    /// A check or action closure panicked
    #[error("Panicked: {0}")]
    Panicked(String),

    /// Opaque error raised while evaluating a check
    #[error("Check error: {0}")]
    Check(String),

    /// Opaque error raised by a repair action
    #[error("Action error: {0}")]
    Action(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
