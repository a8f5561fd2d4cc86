//! Repair actions: named side-effecting remediation operations

use crate::utils::error::Result;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A named remediation operation
///
/// The healer bounds every execution with the target check's timeout and
/// cancels by dropping the future, so long-running actions should await at
/// points where stopping is safe.
#[async_trait]
pub trait RepairAction: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    async fn execute(&self) -> Result<()>;
}

/// Closure type wrapped by [`FnAction`]
pub type ActionFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A repair action backed by a closure
#[derive(Clone)]
pub struct FnAction {
    name: String,
    description: String,
    action: ActionFn,
}

impl FnAction {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            action: Arc::new(move || f().boxed()),
        }
    }

    /// Share as a trait object
    pub fn into_arc(self) -> Arc<dyn RepairAction> {
        Arc::new(self)
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[async_trait]
impl RepairAction for FnAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self) -> Result<()> {
        (self.action)().await
    }
}
