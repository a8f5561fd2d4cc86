//! Health monitor: per-target control loops with auto-repair
//!
//! # Module Structure
//!
//! - `config` - Monitor configuration and trigger mode
//! - `status` - Per-target `CheckerStatus`
//! - `monitor` - `HealthMonitor` lifecycle and status queries
//! - `tasks` - The per-target loop and tick logic
//! - `tests` - Test suite for the monitor

pub mod config;
pub mod monitor;
pub mod status;
mod tasks;

pub use config::{MonitorConfig, TriggerMode};
pub use monitor::HealthMonitor;
pub use status::CheckerStatus;
