//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `settings_validators`: Monitor and healer settings
//! - `check_validators`: Check, probe and repair definitions
//! - `tests`: Test suite for all validators

mod check_validators;
mod settings_validators;
mod trait_def;

pub use trait_def::Validate;
