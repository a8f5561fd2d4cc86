//! The check contract and its closure-backed implementation

use super::types::CheckResult;
use crate::utils::error::{HealthError, Result};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default bound for one evaluation
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
/// Default polling period advertised by a check
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// A named unit of health evaluation with optional self-recovery
///
/// Implementations must be cheap to share: the registry hands out
/// `Arc<dyn Check>` snapshots and the monitor evaluates them from its own
/// tasks. `check` should report problems through the returned result rather
/// than panicking; the registry still converts a panic into an unhealthy
/// verdict.
#[async_trait]
pub trait Check: Send + Sync {
    /// Unique key within a registry
    fn name(&self) -> &str;

    /// Free-form category tag such as `"system"` or `"service"`
    fn check_type(&self) -> &str;

    /// Owning subsystem
    fn component(&self) -> &str;

    /// Maximum duration of one evaluation; zero means unbounded
    fn timeout(&self) -> Duration {
        DEFAULT_CHECK_TIMEOUT
    }

    /// Desired polling period (informational, the monitor decides)
    fn interval(&self) -> Duration {
        DEFAULT_CHECK_INTERVAL
    }

    fn failure_threshold(&self) -> u32 {
        3
    }

    fn success_threshold(&self) -> u32 {
        1
    }

    /// Whether `recover` can be attempted
    fn is_recoverable(&self) -> bool {
        false
    }

    /// Evaluate health
    async fn check(&self) -> CheckResult;

    /// Attempt to fix the target
    async fn recover(&self) -> Result<()> {
        Err(HealthError::NotRecoverable(self.name().to_string()))
    }
}

/// Evaluation closure used by [`BaseCheck`]
pub type CheckFn = Arc<dyn Fn() -> BoxFuture<'static, CheckResult> + Send + Sync>;
/// Recovery closure used by [`BaseCheck`]
pub type RecoverFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A check assembled from closures
///
/// ```rust,no_run
/// use selfheal::core::health::{BaseCheck, CheckResult};
///
/// let check = BaseCheck::new("cache", "service", "storage")
///     .with_check(|| async { CheckResult::healthy("cache reachable") })
///     .with_failure_threshold(2);
/// ```
#[derive(Clone)]
pub struct BaseCheck {
    name: String,
    check_type: String,
    component: String,
    timeout: Duration,
    interval: Duration,
    failure_threshold: u32,
    success_threshold: u32,
    recoverable: bool,
    check_fn: Option<CheckFn>,
    recover_fn: Option<RecoverFn>,
}

impl BaseCheck {
    /// Create a check with default timing and no evaluation function
    pub fn new(
        name: impl Into<String>,
        check_type: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            check_type: check_type.into(),
            component: component.into(),
            timeout: DEFAULT_CHECK_TIMEOUT,
            interval: DEFAULT_CHECK_INTERVAL,
            failure_threshold: 3,
            success_threshold: 1,
            recoverable: false,
            check_fn: None,
            recover_fn: None,
        }
    }

    /// Set the evaluation function
    pub fn with_check<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult> + Send + 'static,
    {
        self.check_fn = Some(Arc::new(move || f().boxed()));
        self
    }

    /// Set the recovery function and mark the check recoverable
    pub fn with_recover<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.recover_fn = Some(Arc::new(move || f().boxed()));
        self.recoverable = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Thresholds below one are clamped to one
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold.max(1);
        self
    }

    /// Override the recoverable flag; it only takes effect with a recovery function
    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }
}

impl fmt::Debug for BaseCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseCheck")
            .field("name", &self.name)
            .field("check_type", &self.check_type)
            .field("component", &self.component)
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("failure_threshold", &self.failure_threshold)
            .field("success_threshold", &self.success_threshold)
            .field("recoverable", &self.is_recoverable())
            .finish()
    }
}

#[async_trait]
impl Check for BaseCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_type(&self) -> &str {
        &self.check_type
    }

    fn component(&self) -> &str {
        &self.component
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    fn success_threshold(&self) -> u32 {
        self.success_threshold
    }

    fn is_recoverable(&self) -> bool {
        self.recoverable && self.recover_fn.is_some()
    }

    async fn check(&self) -> CheckResult {
        match &self.check_fn {
            Some(check_fn) => check_fn().await,
            None => CheckResult::unknown("no check function configured"),
        }
    }

    async fn recover(&self) -> Result<()> {
        match &self.recover_fn {
            Some(recover_fn) if self.recoverable => recover_fn().await,
            _ => Err(HealthError::NotRecoverable(self.name.clone())),
        }
    }
}
