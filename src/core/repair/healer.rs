//! Self-healing orchestration
//!
//! The healer looks up the strategy bound to a check, runs the chosen action
//! under the check's timeout and the panic boundary, records the outcome and
//! re-verifies. At most one repair per check name is ever in flight: the
//! in-flight set is a single mutex-guarded set, so testing for a name and
//! marking it happen atomically.

use super::history::HistoryStore;
use super::strategy::RepairStrategy;
use super::types::{HealHistory, HealStats, RepairResult, RepairTarget};
use crate::core::health::{Check, CheckRegistry, CheckResult, evaluate};
use crate::utils::error::recovery::run_bounded;
use crate::utils::error::{HealthError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Action name recorded for heals that go through `Check::recover`
pub const RECOVER_ACTION: &str = "recover";

/// Result of [`SelfHealer::check_and_repair`]
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The verdict after the repair, or the original one when nothing ran
    pub check_result: CheckResult,
    pub repair: Option<RepairResult>,
}

/// Result of [`SelfHealer::check_and_repair_all`]
#[derive(Debug, Default)]
pub struct RepairReport {
    pub checks: HashMap<String, CheckResult>,
    pub repairs: HashMap<String, RepairResult>,
    /// Errors in processing order
    pub errors: Vec<(String, HealthError)>,
}

impl RepairReport {
    pub fn last_error(&self) -> Option<&HealthError> {
        self.errors.last().map(|(_, error)| error)
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Marks a check name as being healed until dropped
struct HealingGuard<'a> {
    healing: &'a Mutex<HashSet<String>>,
    name: String,
}

impl<'a> HealingGuard<'a> {
    fn acquire(healing: &'a Mutex<HashSet<String>>, name: &str) -> Result<Self> {
        if !healing.lock().insert(name.to_string()) {
            return Err(HealthError::AlreadyHealing(name.to_string()));
        }
        Ok(Self {
            healing,
            name: name.to_string(),
        })
    }
}

impl Drop for HealingGuard<'_> {
    fn drop(&mut self) {
        self.healing.lock().remove(&self.name);
    }
}

/// Repair orchestrator
pub struct SelfHealer {
    registry: Arc<CheckRegistry>,
    strategies: RwLock<HashMap<String, Arc<dyn RepairStrategy>>>,
    healing: Mutex<HashSet<String>>,
    history: HistoryStore,
}

impl SelfHealer {
    pub fn new(registry: Arc<CheckRegistry>) -> Self {
        Self::with_history(registry, HistoryStore::default())
    }

    pub fn with_history(registry: Arc<CheckRegistry>, history: HistoryStore) -> Self {
        Self {
            registry,
            strategies: RwLock::new(HashMap::new()),
            healing: Mutex::new(HashSet::new()),
            history,
        }
    }

    pub fn registry(&self) -> &Arc<CheckRegistry> {
        &self.registry
    }

    /// Bind a strategy to a check name; the last registration wins
    pub fn register_strategy(&self, check_name: impl Into<String>, strategy: Arc<dyn RepairStrategy>) {
        let check_name = check_name.into();
        info!(check = %check_name, strategy = %strategy.name(), "Registered repair strategy");
        self.strategies.write().insert(check_name, strategy);
    }

    pub fn unregister_strategy(&self, check_name: &str) -> Result<()> {
        match self.strategies.write().remove(check_name) {
            Some(_) => {
                info!(check = %check_name, "Unregistered repair strategy");
                Ok(())
            }
            None => Err(HealthError::NoStrategy(check_name.to_string())),
        }
    }

    pub fn get_strategy(&self, check_name: &str) -> Option<Arc<dyn RepairStrategy>> {
        self.strategies.read().get(check_name).cloned()
    }

    pub fn is_healing(&self, check_name: &str) -> bool {
        self.healing.lock().contains(check_name)
    }

    /// Run the check's own recovery
    ///
    /// Fails with `NotRecoverable` or `AlreadyHealing` before anything runs.
    /// A failed recovery is still recorded and comes back as `RepairFailed`
    /// carrying the recorded result.
    pub async fn heal(&self, check: &dyn Check) -> Result<RepairResult> {
        let name = check.name();
        if !check.is_recoverable() {
            return Err(HealthError::NotRecoverable(name.to_string()));
        }
        let _guard = HealingGuard::acquire(&self.healing, name)?;

        self.run_action(
            &RepairTarget::of(check),
            RECOVER_ACTION,
            check.timeout(),
            check.recover(),
        )
        .await
    }

    /// [`heal`](Self::heal) a registered check by name
    pub async fn heal_by_name(&self, name: &str) -> Result<RepairResult> {
        let check = self
            .registry
            .get(name)
            .ok_or_else(|| HealthError::not_found(name))?;
        self.heal(check.as_ref()).await
    }

    /// Evaluate a check and repair it through its strategy when warranted
    ///
    /// A healthy check is a no-op. Otherwise the bound strategy decides; when
    /// it chooses an action the action runs like [`heal`](Self::heal) and the
    /// check is evaluated again so the caller sees whether the repair worked.
    /// The re-evaluation also follows a failed action; its verdict rides on the
    /// returned `RepairFailed`.
    pub async fn check_and_repair(&self, name: &str) -> Result<RepairOutcome> {
        let check = self
            .registry
            .get(name)
            .ok_or_else(|| HealthError::not_found(name))?;
        let result = evaluate(check.as_ref()).await;
        self.repair_with(check.as_ref(), result, true).await
    }

    /// Evaluate every check and repair the unhealthy ones that have a strategy
    ///
    /// Checks are processed in name order; one failure never stops the rest.
    pub async fn check_and_repair_all(&self) -> RepairReport {
        let mut results = self.registry.run_checks().await;
        let mut names: Vec<String> = results.keys().cloned().collect();
        names.sort();

        let mut report = RepairReport::default();
        for name in names {
            let Some(result) = results.remove(&name) else {
                continue;
            };
            let Some(check) = self.registry.get(&name) else {
                report.checks.insert(name, result);
                continue;
            };

            match self.repair_with(check.as_ref(), result.clone(), false).await {
                Ok(outcome) => {
                    if let Some(repair) = outcome.repair {
                        report.repairs.insert(name.clone(), repair);
                    }
                    report.checks.insert(name, outcome.check_result);
                }
                Err(error) => {
                    if let Some(repair) = error.repair_result() {
                        report.repairs.insert(name.clone(), repair.clone());
                    }
                    let fresh = error.check_result().cloned().unwrap_or(result);
                    report.checks.insert(name.clone(), fresh);
                    report.errors.push((name, error));
                }
            }
        }

        if let Some(error) = report.last_error() {
            warn!(failures = report.errors.len(), error = %error, "Repair pass finished with errors");
        }
        report
    }

    async fn repair_with(
        &self,
        check: &dyn Check,
        result: CheckResult,
        require_strategy: bool,
    ) -> Result<RepairOutcome> {
        let name = check.name();
        let no_repair = |check_result| RepairOutcome {
            check_result,
            repair: None,
        };

        if result.is_healthy() {
            return Ok(no_repair(result));
        }

        let Some(strategy) = self.get_strategy(name) else {
            if require_strategy {
                return Err(HealthError::NoStrategy(name.to_string()));
            }
            debug!(check = %name, "No repair strategy");
            return Ok(no_repair(result));
        };

        if !strategy.should_repair(&result) {
            debug!(check = %name, strategy = %strategy.name(), status = %result.status, "Strategy declined repair");
            return Ok(no_repair(result));
        }

        let Some(action) = strategy.repair_action(&result) else {
            if require_strategy {
                return Err(HealthError::NoAction(name.to_string()));
            }
            debug!(check = %name, "Strategy selected no action");
            return Ok(no_repair(result));
        };

        let attempt = {
            let _guard = HealingGuard::acquire(&self.healing, name)?;
            self.run_action(
                &RepairTarget::of(check),
                action.name(),
                check.timeout(),
                action.execute(),
            )
            .await
        };

        let check_result = evaluate(check).await;
        info!(check = %name, status = %check_result.status, "Re-checked after repair");
        match attempt {
            Ok(repair) => Ok(RepairOutcome {
                check_result,
                repair: Some(repair),
            }),
            Err(error) => Err(error.with_check_result(check_result)),
        }
    }

    async fn run_action<F>(
        &self,
        target: &RepairTarget,
        action_name: &str,
        timeout: Duration,
        action: F,
    ) -> Result<RepairResult>
    where
        F: Future<Output = Result<()>>,
    {
        info!(check = %target.name, action = %action_name, "Starting repair");
        let start_time = chrono::Utc::now();
        let started = Instant::now();

        let outcome = run_bounded(timeout, action).await;
        let result =
            RepairResult::from_outcome(target, action_name, start_time, started.elapsed(), &outcome);
        self.history.record(result.clone());

        match outcome {
            Ok(()) => {
                info!(
                    check = %target.name,
                    action = %action_name,
                    duration_ms = result.duration.as_millis() as u64,
                    "Repair succeeded"
                );
                Ok(result)
            }
            Err(source) => {
                error!(check = %target.name, action = %action_name, error = %source, "Repair failed");
                Err(HealthError::repair_failed(result, source))
            }
        }
    }

    pub fn get_heal_history(&self, check_name: &str) -> Option<HealHistory> {
        self.history.history(check_name)
    }

    pub fn get_all_heal_history(&self) -> HashMap<String, HealHistory> {
        self.history.all()
    }

    /// Global bounded list of repairs, oldest first
    pub fn get_repair_history(&self) -> Vec<RepairResult> {
        self.history.global()
    }

    pub fn get_heal_stats(&self) -> HealStats {
        self.history.stats()
    }

    pub fn set_history_limit(&self, limit: usize) {
        self.history.set_history_limit(limit);
    }

    pub fn set_global_history_limit(&self, limit: usize) {
        self.history.set_global_limit(limit);
    }

    pub fn clear_heal_history(&self, check_name: &str) -> bool {
        self.history.clear(check_name)
    }

    pub fn clear_all_heal_history(&self) {
        self.history.clear_all();
    }
}

impl std::fmt::Debug for SelfHealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut strategies: Vec<String> = self.strategies.read().keys().cloned().collect();
        strategies.sort();
        f.debug_struct("SelfHealer")
            .field("strategies", &strategies)
            .field("healing", &self.healing.lock().len())
            .finish()
    }
}
