//! Health monitor implementation
//!
//! One task per watched check. Tasks share nothing but the status map, so a
//! slow or stuck check only delays its own loop.

use super::config::MonitorConfig;
use super::status::CheckerStatus;
use crate::core::health::{CheckRegistry, CheckResult, HealthStatus, aggregate_statuses};
use crate::core::repair::SelfHealer;
use crate::utils::error::{HealthError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Monitor-owned state of one target
#[derive(Debug)]
pub(super) struct TargetState {
    pub(super) status: CheckerStatus,
    pub(super) history: VecDeque<CheckResult>,
    /// Set once the failure threshold is reached, cleared on recovery
    pub(super) incident: bool,
    /// Whether an edge-triggered repair already fired in this incident
    pub(super) fired: bool,
}

impl TargetState {
    pub(super) fn new(name: &str) -> Self {
        Self {
            status: CheckerStatus::new(name),
            history: VecDeque::new(),
            incident: false,
            fired: false,
        }
    }
}

/// State shared between the monitor handle and its tasks
pub(super) struct MonitorShared {
    pub(super) registry: Arc<CheckRegistry>,
    pub(super) healer: Arc<SelfHealer>,
    pub(super) config: MonitorConfig,
    pub(super) targets: RwLock<HashMap<String, TargetState>>,
    pub(super) history_limit: AtomicUsize,
}

struct TargetTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Per-target control loops with threshold-triggered repair
pub struct HealthMonitor {
    pub(super) shared: Arc<MonitorShared>,
    tasks: Mutex<HashMap<String, TargetTask>>,
    cancel: Mutex<CancellationToken>,
    running: AtomicBool,
}

impl HealthMonitor {
    pub fn new(registry: Arc<CheckRegistry>, healer: Arc<SelfHealer>, config: MonitorConfig) -> Self {
        let history_limit = AtomicUsize::new(config.status_history_limit.max(1));
        Self {
            shared: Arc::new(MonitorShared {
                registry,
                healer,
                config,
                targets: RwLock::new(HashMap::new()),
                history_limit,
            }),
            tasks: Mutex::new(HashMap::new()),
            cancel: Mutex::new(CancellationToken::new()),
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start one loop per registered check
    ///
    /// Starting a running monitor is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("Health monitor already running");
            return;
        }
        *self.cancel.lock() = CancellationToken::new();

        let names = self.shared.registry.names();
        info!(targets = names.len(), "Starting health monitor");
        for name in names {
            self.spawn_target(&name);
        }
    }

    /// Cancel every loop, wait for them and drop all statuses
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        info!("Stopping health monitor");
        self.cancel.lock().cancel();

        let tasks: Vec<TargetTask> = self.tasks.lock().drain().map(|(_, task)| task).collect();
        for task in tasks {
            if let Err(e) = task.handle.await {
                if e.is_panic() {
                    warn!("Monitor task panicked: {}", e);
                }
            }
        }

        self.shared.targets.write().clear();
        info!("Health monitor stopped");
    }

    /// Start watching a check registered after `start`
    ///
    /// Watching an already watched check is a no-op. When the monitor is not
    /// running only the status entry is created.
    pub fn watch(&self, name: &str) -> Result<()> {
        if !self.shared.registry.contains(name) {
            return Err(HealthError::not_found(name));
        }
        self.shared
            .targets
            .write()
            .entry(name.to_string())
            .or_insert_with(|| TargetState::new(name));

        if self.is_running() {
            self.spawn_target(name);
        }
        Ok(())
    }

    /// Stop watching a check and forget its status
    pub async fn unwatch(&self, name: &str) -> Result<()> {
        // The loop must be gone before the entry goes, or a finishing tick
        // would recreate it
        let task = self.tasks.lock().remove(name);
        let had_task = task.is_some();
        if let Some(task) = task {
            task.token.cancel();
            let _ = task.handle.await;
        }

        let known = self.shared.targets.write().remove(name).is_some();
        if had_task {
            info!(check = %name, "Stopped watching health check");
            Ok(())
        } else if known {
            Ok(())
        } else {
            Err(HealthError::not_found(name))
        }
    }

    /// Run one tick for `name` immediately, outside its schedule
    pub async fn check_now(&self, name: &str) -> Result<CheckerStatus> {
        self.shared
            .tick(name)
            .await
            .ok_or_else(|| HealthError::not_found(name))
    }

    pub fn get_status(&self, name: &str) -> Option<CheckerStatus> {
        self.shared
            .targets
            .read()
            .get(name)
            .map(|target| target.status.clone())
    }

    pub fn get_all_status(&self) -> HashMap<String, CheckerStatus> {
        self.shared
            .targets
            .read()
            .iter()
            .map(|(name, target)| (name.clone(), target.status.clone()))
            .collect()
    }

    /// Recent results for `name`, oldest first
    pub fn get_status_history(&self, name: &str) -> Vec<CheckResult> {
        self.shared
            .targets
            .read()
            .get(name)
            .map(|target| target.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Overall status over every tracked target; `Unknown` when there is none
    pub fn get_system_health(&self) -> HealthStatus {
        aggregate_statuses(
            self.shared
                .targets
                .read()
                .values()
                .map(|target| target.status.status),
        )
    }

    /// Change the per-target history cap and trim existing histories
    pub fn set_status_history_limit(&self, limit: usize) {
        let limit = limit.max(1);
        self.shared.history_limit.store(limit, Ordering::Release);
        for target in self.shared.targets.write().values_mut() {
            while target.history.len() > limit {
                target.history.pop_front();
            }
        }
    }

    fn spawn_target(&self, name: &str) {
        let mut tasks = self.tasks.lock();
        if let Some(task) = tasks.get(name) {
            if !task.handle.is_finished() {
                return;
            }
        }

        self.shared
            .targets
            .write()
            .entry(name.to_string())
            .or_insert_with(|| TargetState::new(name));

        let token = self.cancel.lock().child_token();
        let handle = tokio::spawn(super::tasks::run_target(
            self.shared.clone(),
            name.to_string(),
            token.clone(),
        ));
        tasks.insert(name.to_string(), TargetTask { token, handle });
        info!(check = %name, "Watching health check");
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.lock().cancel();
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("config", &self.shared.config)
            .field("running", &self.is_running())
            .field("tasks", &self.tasks.lock().len())
            .finish()
    }
}
