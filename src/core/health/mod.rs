//! Health evaluation: checks, the registry and result aggregation
//!
//! # Module Structure
//!
//! - `types` - Health status levels and check results
//! - `check` - The `Check` contract and the closure-backed `BaseCheck`
//! - `composite` - A check that reduces child checks
//! - `registry` - Thread-safe check registry and bounded evaluation
//! - `aggregator` - Severity-ordered reduction of results
//! - `tests` - Test suite for health evaluation

pub mod aggregator;
pub mod check;
pub mod composite;
pub mod registry;
pub mod types;

pub use aggregator::{aggregate, aggregate_statuses};
pub use check::{BaseCheck, Check, CheckFn, RecoverFn};
pub use composite::{Aggregator, CompositeCheck};
pub use registry::{CheckRegistry, evaluate};
pub use types::{CheckResult, HealthStatus};
