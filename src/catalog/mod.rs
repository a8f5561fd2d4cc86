//! Built-in checks and repair actions
//!
//! Thin leaf implementations of the `Check` and `RepairAction` contracts.
//! Everything here is built on `BaseCheck` / `FnAction`, so custom probes
//! and actions are interchangeable with these.

pub mod actions;
pub mod checks;

/// Type tag of resource probes
pub const SYSTEM_CHECK_TYPE: &str = "system";
/// Type tag of service probes
pub const SERVICE_CHECK_TYPE: &str = "service";
