//! Engine composition
//!
//! `HealthEngine` owns the registry, the healer and the monitor and wires
//! them together explicitly. Nothing in the crate is a process-wide global,
//! so several engines can run side by side.

use crate::config::EngineConfig;
use crate::core::health::{Check, CheckRegistry, CheckResult, HealthStatus, aggregate};
use crate::core::monitor::HealthMonitor;
use crate::core::repair::{RepairResult, RepairStrategy, SelfHealer};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a single check-and-repair pass
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub status: HealthStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<String, CheckResult>,
    pub repairs: BTreeMap<String, RepairResult>,
    /// Check name to error text
    pub errors: BTreeMap<String, String>,
}

impl EngineReport {
    pub fn is_healthy(&self) -> bool {
        self.status != HealthStatus::Unhealthy
    }
}

/// Registry, healer and monitor wired together
pub struct HealthEngine {
    config: EngineConfig,
    registry: Arc<CheckRegistry>,
    healer: Arc<SelfHealer>,
    monitor: HealthMonitor,
}

impl HealthEngine {
    /// Build an engine with no checks registered
    pub fn new(config: EngineConfig) -> Self {
        let registry = Arc::new(CheckRegistry::new());
        let healer = Arc::new(SelfHealer::with_history(
            registry.clone(),
            config.healer.history_store(),
        ));
        let monitor = HealthMonitor::new(
            registry.clone(),
            healer.clone(),
            config.monitor.to_monitor_config(),
        );

        Self {
            config,
            registry,
            healer,
            monitor,
        }
    }

    /// Build an engine and register every configured check and repair
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let engine = Self::new(config);

        for definition in &engine.config.checks {
            let check = definition.build_check()?;
            let name = check.name().to_string();
            engine.registry.register(check)?;

            if let Some(strategy) = definition.build_strategy()? {
                debug!(check = %name, strategy = %strategy.name(), "Registering configured repair");
                engine.healer.register_strategy(name, strategy);
            }
        }

        info!(
            checks = engine.registry.count(),
            "Health engine initialized"
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CheckRegistry> {
        &self.registry
    }

    pub fn healer(&self) -> &Arc<SelfHealer> {
        &self.healer
    }

    pub fn monitor(&self) -> &HealthMonitor {
        &self.monitor
    }

    /// Start the per-target monitor loops
    pub fn start(&self) {
        info!("Starting health engine");
        self.monitor.start();
    }

    /// Stop every loop and wait for them to exit
    pub async fn stop(&self) {
        self.monitor.stop().await;
        info!("Health engine stopped");
    }

    /// Evaluate every check once, repairing where a strategy applies
    pub async fn run_once(&self) -> EngineReport {
        let report = self.healer.check_and_repair_all().await;

        let results: Vec<CheckResult> = report.checks.values().cloned().collect();
        let summary = aggregate(&results);

        EngineReport {
            status: summary.status,
            message: summary.message,
            timestamp: Utc::now(),
            checks: sorted(report.checks),
            repairs: sorted(report.repairs),
            errors: report
                .errors
                .into_iter()
                .map(|(name, error)| (name, error.to_string()))
                .collect(),
        }
    }
}

fn sorted<V>(map: HashMap<String, V>) -> BTreeMap<String, V> {
    map.into_iter().collect()
}
