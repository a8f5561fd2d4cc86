//! Configuration management for the engine
//!
//! This module handles loading, validation, and translation of the YAML
//! engine configuration into monitor, healer and check instances.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{HealthError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub healer: HealerSettings,
    #[serde(default)]
    pub checks: Vec<CheckDefinition>,
}

impl EngineConfig {
    /// Load configuration from a YAML file, apply env overrides and validate
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HealthError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;

        debug!(checks = config.checks.len(), "Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate a YAML document (no env overrides)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| HealthError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        Validate::validate(&self.monitor)
            .map_err(|e| HealthError::Config(format!("Monitor config error: {}", e)))?;
        Validate::validate(&self.healer)
            .map_err(|e| HealthError::Config(format!("Healer config error: {}", e)))?;

        let mut names = HashSet::new();
        for definition in &self.checks {
            let name = definition.check_name();
            definition
                .validate()
                .map_err(|e| HealthError::Config(format!("Check '{}' config error: {}", name, e)))?;
            if !names.insert(name.clone()) {
                return Err(HealthError::Config(format!("Duplicate check name: {}", name)));
            }
        }

        debug!("Configuration validation completed");
        Ok(())
    }
}
