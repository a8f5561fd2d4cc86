//! Thread-safe check registry
//!
//! Lookups return `Arc` snapshots, never references into the map, so a caller
//! holding a check cannot block or corrupt registration.

use super::aggregator::aggregate;
use super::check::Check;
use super::types::CheckResult;
use crate::utils::error::recovery::{TimeoutWrapper, catch_panic};
use crate::utils::error::{HealthError, Result};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Registry of checks keyed by unique name
#[derive(Default)]
pub struct CheckRegistry {
    checks: RwLock<HashMap<String, Arc<dyn Check>>>,
}

impl CheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check; fails if the name is taken
    pub fn register(&self, check: Arc<dyn Check>) -> Result<()> {
        let name = check.name().to_string();
        let mut checks = self.checks.write();
        if checks.contains_key(&name) {
            return Err(HealthError::AlreadyExists(name));
        }
        checks.insert(name.clone(), check);
        info!(check = %name, "Registered health check");
        Ok(())
    }

    /// Remove a check; fails if absent
    pub fn unregister(&self, name: &str) -> Result<()> {
        match self.checks.write().remove(name) {
            Some(_) => {
                info!(check = %name, "Unregistered health check");
                Ok(())
            }
            None => Err(HealthError::not_found(name)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Check>> {
        self.checks.read().get(name).cloned()
    }

    pub fn get_all(&self) -> Vec<Arc<dyn Check>> {
        self.checks.read().values().cloned().collect()
    }

    pub fn get_by_type(&self, check_type: &str) -> Vec<Arc<dyn Check>> {
        self.checks
            .read()
            .values()
            .filter(|check| check.check_type() == check_type)
            .cloned()
            .collect()
    }

    pub fn get_by_component(&self, component: &str) -> Vec<Arc<dyn Check>> {
        self.checks
            .read()
            .values()
            .filter(|check| check.component() == component)
            .cloned()
            .collect()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checks.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.read().contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.checks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.read().is_empty()
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.checks.write().clear();
        info!("Cleared health check registry");
    }

    /// Run one check by name, or `None` if it is not registered
    pub async fn run_check(&self, name: &str) -> Option<CheckResult> {
        let Some(check) = self.get(name) else {
            warn!(check = %name, "Health check not found");
            return None;
        };
        Some(evaluate(check.as_ref()).await)
    }

    /// Run every registered check concurrently
    ///
    /// A failing or panicking check only affects its own entry.
    pub async fn run_checks(&self) -> HashMap<String, CheckResult> {
        let checks = self.get_all();
        let results = join_all(checks.iter().map(|check| evaluate(check.as_ref()))).await;
        checks
            .iter()
            .map(|check| check.name().to_string())
            .zip(results)
            .collect()
    }

    /// Run every check and reduce the results to one verdict
    pub async fn system_status(&self) -> CheckResult {
        let results: Vec<CheckResult> = self.run_checks().await.into_values().collect();
        aggregate(&results)
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.names())
            .finish()
    }
}

/// Evaluate a check under its timeout and the panic boundary
///
/// The returned result is stamped with the wall-clock finish time, the
/// measured duration and the check's identity.
pub async fn evaluate(check: &dyn Check) -> CheckResult {
    let timeout = check.timeout();
    let started = Instant::now();

    let mut result = match TimeoutWrapper::new(timeout).call(catch_panic(check.check())).await {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => {
            warn!(check = %check.name(), error = %error, "Health check panicked");
            CheckResult::unhealthy(format!("check {} panicked", check.name())).with_error(error)
        }
        Err(error) => {
            warn!(check = %check.name(), timeout = ?timeout, "Health check timed out");
            CheckResult::unhealthy(format!("check {} timed out after {:?}", check.name(), timeout))
                .with_error(error)
        }
    };

    result.timestamp = chrono::Utc::now();
    result.duration = started.elapsed();
    result.check_name = check.name().to_string();
    result.check_type = check.check_type().to_string();
    result.component = check.component().to_string();

    debug!(
        check = %result.check_name,
        status = %result.status,
        duration_ms = result.duration.as_millis() as u64,
        "Health check finished"
    );
    result
}
