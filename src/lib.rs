//! # selfheal
//!
//! A health-check and self-healing control-loop engine.
//!
//! Checks are registered in a [`CheckRegistry`] and evaluated under a timeout
//! and a panic boundary. A [`HealthMonitor`] runs one loop per check, counts
//! consecutive failures and, once a threshold is crossed, asks the
//! [`SelfHealer`] to run the repair action chosen by the check's
//! [`RepairStrategy`]. Every repair is recorded in a bounded history.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use selfheal::{CheckResult, BaseCheck, EngineConfig, HealthEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> selfheal::Result<()> {
//!     let engine = HealthEngine::new(EngineConfig::default());
//!     engine.registry().register(Arc::new(
//!         BaseCheck::new("ping", "custom", "demo")
//!             .with_check(|| async { CheckResult::healthy("pong") }),
//!     ))?;
//!
//!     let report = engine.run_once().await;
//!     println!("system is {}", report.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Configured Mode
//!
//! ```rust,no_run
//! use selfheal::{EngineConfig, HealthEngine};
//!
//! #[tokio::main]
//! async fn main() -> selfheal::Result<()> {
//!     let config = EngineConfig::from_file("config/selfheal.yaml").await?;
//!     let engine = HealthEngine::from_config(config)?;
//!     engine.start();
//!     tokio::signal::ctrl_c().await?;
//!     engine.stop().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod utils;

// Re-export main types
pub use config::EngineConfig;
pub use engine::{EngineReport, HealthEngine};
pub use utils::error::{HealthError, Result};

pub use core::health::{
    BaseCheck, Check, CheckRegistry, CheckResult, CompositeCheck, HealthStatus, aggregate,
    aggregate_statuses,
};
pub use core::monitor::{CheckerStatus, HealthMonitor, MonitorConfig, TriggerMode};
pub use core::repair::{
    FnAction, HealHistory, HealStats, RepairAction, RepairResult, RepairStrategy, SelfHealer,
    SimpleStrategy, StatusStrategy,
};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information stamped by `build.rs`
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Seconds since the epoch at build time
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
