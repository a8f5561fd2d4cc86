//! Check definition validators

use super::trait_def::Validate;
use crate::config::models::*;

fn validate_percent(threshold: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&threshold) {
        return Err(format!("Threshold {} must be between 0 and 100", threshold));
    }
    Ok(())
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(())
}

impl Validate for CheckDefinition {
    fn validate(&self) -> Result<(), String> {
        self.probe.validate()?;

        if self.timeout_secs == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.interval_secs == Some(0) {
            return Err("Interval must be greater than 0".to_string());
        }

        if self.failure_threshold == Some(0) || self.success_threshold == Some(0) {
            return Err("Thresholds must be at least 1".to_string());
        }

        if let Some(repair) = &self.repair {
            repair.validate()?;
        }

        Ok(())
    }
}

impl Validate for ProbeDefinition {
    fn validate(&self) -> Result<(), String> {
        match self {
            Self::CpuUsage { threshold }
            | Self::MemoryUsage { threshold }
            | Self::ProcessMemory { threshold }
            | Self::DiskUsage { threshold, .. } => validate_percent(*threshold),
            Self::DiskSpace { .. } | Self::TempDirCleanup { .. } => Ok(()),
            Self::ThreadCount { max } => {
                if *max == 0 {
                    return Err("Thread limit must be greater than 0".to_string());
                }
                Ok(())
            }
            Self::Http {
                name, url, method, ..
            } => {
                require(name, "Check name")?;
                url::Url::parse(url).map_err(|e| format!("Invalid URL '{}': {}", url, e))?;
                reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                    .map_err(|_| format!("Invalid HTTP method: {}", method))?;
                Ok(())
            }
            Self::Tcp { name, host, port } => {
                require(name, "Check name")?;
                require(host, "Host")?;
                if *port == 0 {
                    return Err("Port must be greater than 0".to_string());
                }
                Ok(())
            }
            Self::Process { name, process } => {
                require(name, "Check name")?;
                require(process, "Process name")
            }
            Self::Database { name, dsn, query } => {
                require(name, "Check name")?;
                require(dsn, "DSN")?;
                require(query, "Query")
            }
            Self::File { name, .. } => require(name, "Check name"),
            Self::Command { name, command, .. } => {
                require(name, "Check name")?;
                require(command, "Command")
            }
        }
    }
}

impl Validate for RepairDefinition {
    fn validate(&self) -> Result<(), String> {
        if self.on.is_empty() {
            return Err("Repair must trigger on at least one status".to_string());
        }

        match &self.action {
            ActionDefinition::CleanupFiles { pattern, .. } => {
                glob::Pattern::new(pattern)
                    .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;
                Ok(())
            }
            ActionDefinition::RunCommand { name, command, .. } => {
                require(name, "Action name")?;
                require(command, "Command")
            }
            ActionDefinition::RestartService {
                service, command, ..
            } => {
                require(service, "Service")?;
                require(command, "Command")
            }
            ActionDefinition::CreateDirectory { .. } | ActionDefinition::CreateFile { .. } => {
                Ok(())
            }
            ActionDefinition::RotateLog { keep, .. } => {
                if *keep == 0 {
                    return Err("Rotated log count must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }
}
