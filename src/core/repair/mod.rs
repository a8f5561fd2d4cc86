//! Repair: actions, strategies, history and the self-healer
//!
//! # Module Structure
//!
//! - `action` - The `RepairAction` contract and closure-backed `FnAction`
//! - `strategy` - `RepairStrategy` with simple and status-set policies
//! - `types` - Repair records, heal history and statistics
//! - `history` - Bounded per-check and global history store
//! - `healer` - `SelfHealer` orchestration and the in-flight guard
//! - `tests` - Test suite for repair

pub mod action;
pub mod healer;
pub mod history;
pub mod strategy;
pub mod types;

pub use action::{ActionFn, FnAction, RepairAction};
pub use healer::{RECOVER_ACTION, RepairOutcome, RepairReport, SelfHealer};
pub use history::{DEFAULT_GLOBAL_HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT, HistoryStore};
pub use strategy::{RepairStrategy, SimpleStrategy, StatusStrategy};
pub use types::{HealCounts, HealHistory, HealStats, RepairResult, RepairTarget};
