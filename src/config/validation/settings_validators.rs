//! Monitor and healer settings validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for MonitorSettings {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating monitor configuration");

        if self.check_interval_secs == 0 {
            return Err("Check interval must be greater than 0".to_string());
        }

        if self.failure_threshold == 0 {
            return Err("Failure threshold must be at least 1".to_string());
        }

        if self.success_threshold == 0 {
            return Err("Success threshold must be at least 1".to_string());
        }

        if self.status_history_limit == 0 {
            return Err("Status history limit must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Validate for HealerSettings {
    fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("History limit must be at least 1".to_string());
        }

        if self.global_history_limit == 0 {
            return Err("Global history limit must be at least 1".to_string());
        }

        Ok(())
    }
}
