//! Repair strategies: when to repair, and with what

use super::action::RepairAction;
use crate::core::health::{CheckResult, HealthStatus};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Policy bound to one check name
pub trait RepairStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the given result warrants a repair
    fn should_repair(&self, result: &CheckResult) -> bool;

    /// The action to run for the given result, if any
    fn repair_action(&self, result: &CheckResult) -> Option<Arc<dyn RepairAction>>;
}

type Predicate = Arc<dyn Fn(&CheckResult) -> bool + Send + Sync>;
type Selector = Arc<dyn Fn(&CheckResult) -> Option<Arc<dyn RepairAction>> + Send + Sync>;

/// Strategy assembled from a predicate and an action selector
#[derive(Clone)]
pub struct SimpleStrategy {
    name: String,
    predicate: Predicate,
    selector: Selector,
}

impl SimpleStrategy {
    pub fn new<P, S>(name: impl Into<String>, predicate: P, selector: S) -> Self
    where
        P: Fn(&CheckResult) -> bool + Send + Sync + 'static,
        S: Fn(&CheckResult) -> Option<Arc<dyn RepairAction>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            selector: Arc::new(selector),
        }
    }

    /// Predicate plus one fixed action
    pub fn with_action<P>(name: impl Into<String>, predicate: P, action: Arc<dyn RepairAction>) -> Self
    where
        P: Fn(&CheckResult) -> bool + Send + Sync + 'static,
    {
        Self::new(name, predicate, move |_| Some(action.clone()))
    }
}

impl fmt::Debug for SimpleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleStrategy")
            .field("name", &self.name)
            .finish()
    }
}

impl RepairStrategy for SimpleStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_repair(&self, result: &CheckResult) -> bool {
        (self.predicate)(result)
    }

    fn repair_action(&self, result: &CheckResult) -> Option<Arc<dyn RepairAction>> {
        (self.selector)(result)
    }
}

/// Repairs with a fixed action whenever the status is in a set (default: Unhealthy)
#[derive(Clone)]
pub struct StatusStrategy {
    name: String,
    statuses: HashSet<HealthStatus>,
    action: Arc<dyn RepairAction>,
}

impl StatusStrategy {
    pub fn new(name: impl Into<String>, action: Arc<dyn RepairAction>) -> Self {
        Self {
            name: name.into(),
            statuses: HashSet::from([HealthStatus::Unhealthy]),
            action,
        }
    }

    /// Replace the triggering statuses
    pub fn with_statuses<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = HealthStatus>,
    {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Also trigger on `status`
    pub fn on_status(mut self, status: HealthStatus) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn action(&self) -> &Arc<dyn RepairAction> {
        &self.action
    }
}

impl fmt::Debug for StatusStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusStrategy")
            .field("name", &self.name)
            .field("statuses", &self.statuses)
            .field("action", &self.action.name())
            .finish()
    }
}

impl RepairStrategy for StatusStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_repair(&self, result: &CheckResult) -> bool {
        self.statuses.contains(&result.status)
    }

    fn repair_action(&self, _result: &CheckResult) -> Option<Arc<dyn RepairAction>> {
        Some(self.action.clone())
    }
}
