//! Healer settings

use super::*;
use crate::core::repair::HistoryStore;
use serde::{Deserialize, Serialize};

/// Healer section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealerSettings {
    /// Repairs kept per check
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Repairs kept across all checks
    #[serde(default = "default_global_history_limit")]
    pub global_history_limit: usize,
}

impl Default for HealerSettings {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            global_history_limit: default_global_history_limit(),
        }
    }
}

impl HealerSettings {
    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::new(self.history_limit, self.global_history_limit)
    }
}
