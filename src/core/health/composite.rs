//! A check built from other checks

use super::aggregator::aggregate;
use super::check::{Check, DEFAULT_CHECK_TIMEOUT};
use super::registry::evaluate;
use super::types::CheckResult;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Reducer used by [`CompositeCheck`]
pub type Aggregator = Arc<dyn Fn(&[CheckResult]) -> CheckResult + Send + Sync>;

/// Evaluates its children concurrently and reduces their verdicts
pub struct CompositeCheck {
    name: String,
    check_type: String,
    component: String,
    timeout: Duration,
    children: RwLock<Vec<Arc<dyn Check>>>,
    aggregator: Aggregator,
}

impl CompositeCheck {
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
            children: RwLock::new(Vec::new()),
            aggregator: Arc::new(aggregate),
        }
    }

    /// Replace the default reducer
    pub fn with_aggregator<F>(mut self, aggregator: F) -> Self
    where
        F: Fn(&[CheckResult]) -> CheckResult + Send + Sync + 'static,
    {
        self.aggregator = Arc::new(aggregator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_child(self, child: Arc<dyn Check>) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&self, child: Arc<dyn Check>) {
        self.children.write().push(child);
    }

    pub fn children(&self) -> Vec<Arc<dyn Check>> {
        self.children.read().clone()
    }
}

impl std::fmt::Debug for CompositeCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCheck")
            .field("name", &self.name)
            .field("children", &self.children.read().len())
            .finish()
    }
}

#[async_trait]
impl Check for CompositeCheck {
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

    async fn check(&self) -> CheckResult {
        let children = self.children();
        let results = join_all(children.iter().map(|child| evaluate(child.as_ref()))).await;
        (self.aggregator)(&results)
    }
}
