//! Configuration data models

pub mod check;
pub mod healer;
pub mod monitor;

pub use check::*;
pub use healer::*;
pub use monitor::*;

pub fn default_true() -> bool {
    true
}

/// Default interval between ticks in seconds
pub fn default_check_interval_secs() -> u64 {
    30
}

/// Default delay before the first tick in seconds
pub fn default_initial_delay_secs() -> u64 {
    5
}

pub fn default_failure_threshold() -> u32 {
    3
}

pub fn default_success_threshold() -> u32 {
    1
}

pub fn default_status_history_limit() -> usize {
    100
}

pub fn default_history_limit() -> usize {
    crate::core::repair::DEFAULT_HISTORY_LIMIT
}

pub fn default_global_history_limit() -> usize {
    crate::core::repair::DEFAULT_GLOBAL_HISTORY_LIMIT
}

pub fn default_http_method() -> String {
    "GET".to_string()
}

pub fn default_expected_status() -> u16 {
    200
}

pub fn default_query() -> String {
    "SELECT 1".to_string()
}

pub fn default_glob() -> String {
    "*".to_string()
}

pub fn default_keep() -> usize {
    5
}
