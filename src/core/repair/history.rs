//! Repair history storage
//!
//! Guarded by its own lock so that recording a slow repair never contends
//! with registry or strategy lookups.

use super::types::{HealHistory, HealStats, RepairResult};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};

/// Default per-check history length
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
/// Default length of the global repair list
pub const DEFAULT_GLOBAL_HISTORY_LIMIT: usize = 100;

#[derive(Debug)]
struct Inner {
    per_check: HashMap<String, HealHistory>,
    global: VecDeque<RepairResult>,
    history_limit: usize,
    global_limit: usize,
}

/// Per-check and global bounded repair histories
#[derive(Debug)]
pub struct HistoryStore {
    inner: RwLock<Inner>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_GLOBAL_HISTORY_LIMIT)
    }
}

impl HistoryStore {
    /// Limits below one are raised to one
    pub fn new(history_limit: usize, global_limit: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                per_check: HashMap::new(),
                global: VecDeque::new(),
                history_limit: history_limit.max(1),
                global_limit: global_limit.max(1),
            }),
        }
    }

    pub fn record(&self, result: RepairResult) {
        let mut inner = self.inner.write();
        let limit = inner.history_limit;
        let global_limit = inner.global_limit;

        inner.global.push_back(result.clone());
        while inner.global.len() > global_limit {
            inner.global.pop_front();
        }

        inner
            .per_check
            .entry(result.check_name.clone())
            .or_insert_with(|| HealHistory::new(result.check_name.clone()))
            .record(result, limit);
    }

    pub fn history(&self, name: &str) -> Option<HealHistory> {
        self.inner.read().per_check.get(name).cloned()
    }

    pub fn all(&self) -> HashMap<String, HealHistory> {
        self.inner.read().per_check.clone()
    }

    /// Global list, oldest first
    pub fn global(&self) -> Vec<RepairResult> {
        self.inner.read().global.iter().cloned().collect()
    }

    pub fn history_limit(&self) -> usize {
        self.inner.read().history_limit
    }

    /// Change the per-check cap and trim existing histories to it
    pub fn set_history_limit(&self, limit: usize) {
        let mut inner = self.inner.write();
        inner.history_limit = limit.max(1);
        let limit = inner.history_limit;
        for history in inner.per_check.values_mut() {
            history.trim(limit);
        }
    }

    pub fn set_global_limit(&self, limit: usize) {
        let mut inner = self.inner.write();
        inner.global_limit = limit.max(1);
        let limit = inner.global_limit;
        while inner.global.len() > limit {
            inner.global.pop_front();
        }
    }

    /// Forget one check's history; returns whether it existed
    pub fn clear(&self, name: &str) -> bool {
        self.inner.write().per_check.remove(name).is_some()
    }

    pub fn clear_all(&self) {
        let mut inner = self.inner.write();
        inner.per_check.clear();
        inner.global.clear();
    }

    pub fn stats(&self) -> HealStats {
        HealStats::from_histories(self.inner.read().per_check.values())
    }
}
