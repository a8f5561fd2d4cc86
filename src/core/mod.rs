//! Core engine
//!
//! - `health` - Checks, the registry and aggregation
//! - `repair` - Repair actions, strategies, history and the self-healer
//! - `monitor` - Per-check control loops with auto-repair

pub mod health;
pub mod monitor;
pub mod repair;
