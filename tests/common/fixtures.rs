//! Test fixtures
//!
//! Real `Check` and `RepairAction` implementations whose outcomes are
//! controlled by the test. No mocks.

use async_trait::async_trait;
use parking_lot::Mutex;
use selfheal::core::health::{Check, CheckResult, HealthStatus};
use selfheal::core::repair::RepairAction;
use selfheal::{HealthError, MonitorConfig, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A check that replays a queue of statuses, then repeats `fallback`
pub struct ScriptedCheck {
    name: String,
    component: String,
    script: Mutex<VecDeque<HealthStatus>>,
    fallback: HealthStatus,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedCheck {
    pub fn new<I>(name: &str, script: I, fallback: HealthStatus) -> Self
    where
        I: IntoIterator<Item = HealthStatus>,
    {
        Self {
            name: name.to_string(),
            component: "tests".to_string(),
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always report `status`
    pub fn constant(name: &str, status: HealthStatus) -> Self {
        Self::new(name, [], status)
    }

    pub fn with_component(mut self, component: &str) -> Self {
        self.component = component.to_string();
        self
    }

    /// Sleep this long inside every evaluation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Check for ScriptedCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_type(&self) -> &str {
        "scripted"
    }

    fn component(&self) -> &str {
        &self.component
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn check(&self) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let status = self.script.lock().pop_front().unwrap_or(self.fallback);
        CheckResult::new(status, format!("scripted {}", status))
    }
}

/// A recoverable check backed by a shared health flag
///
/// `recover` and [`ToggleCheck::fixer`] both set the flag.
pub struct ToggleCheck {
    name: String,
    healthy: Arc<AtomicBool>,
    recoverable: bool,
    recoveries: AtomicUsize,
}

impl ToggleCheck {
    pub fn new(name: &str, healthy: bool) -> Self {
        Self {
            name: name.to_string(),
            healthy: Arc::new(AtomicBool::new(healthy)),
            recoverable: true,
            recoveries: AtomicUsize::new(0),
        }
    }

    pub fn not_recoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        self.healthy.clone()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn recoveries(&self) -> usize {
        self.recoveries.load(Ordering::SeqCst)
    }

    /// An action that repairs this check
    pub fn fixer(&self, name: &str) -> Arc<CountingAction> {
        Arc::new(CountingAction::new(name).sets(self.flag()))
    }
}

#[async_trait]
impl Check for ToggleCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_type(&self) -> &str {
        "toggle"
    }

    fn component(&self) -> &str {
        "tests"
    }

    fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    async fn check(&self) -> CheckResult {
        if self.healthy.load(Ordering::SeqCst) {
            CheckResult::healthy("flag set")
        } else {
            CheckResult::unhealthy("flag cleared")
        }
    }

    async fn recover(&self) -> Result<()> {
        self.recoveries.fetch_add(1, Ordering::SeqCst);
        self.healthy.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// An action that counts executions and optionally fails or fixes a flag
pub struct CountingAction {
    name: String,
    runs: AtomicUsize,
    fails: bool,
    delay: Duration,
    fixes: Option<Arc<AtomicBool>>,
}

impl CountingAction {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            runs: AtomicUsize::new(0),
            fails: false,
            delay: Duration::ZERO,
            fixes: None,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set `flag` to true on every successful run
    pub fn sets(mut self, flag: Arc<AtomicBool>) -> Self {
        self.fixes = Some(flag);
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepairAction for CountingAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "counting test action"
    }

    async fn execute(&self) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fails {
            return Err(HealthError::action(format!("{} failed", self.name)));
        }
        if let Some(flag) = &self.fixes {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Monitor timings short enough for tests
pub fn fast_monitor_config(failure_threshold: u32) -> MonitorConfig {
    MonitorConfig {
        check_interval: Duration::from_millis(20),
        initial_delay: Duration::ZERO,
        failure_threshold,
        ..Default::default()
    }
}
