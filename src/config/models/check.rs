//! Declarative check and repair definitions

use super::*;
use crate::catalog::{actions, checks};
use crate::core::health::{BaseCheck, Check, HealthStatus};
use crate::core::repair::{RepairAction, RepairStrategy, StatusStrategy};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A check entry from the `checks` list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDefinition {
    #[serde(flatten)]
    pub probe: ProbeDefinition,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub failure_threshold: Option<u32>,
    #[serde(default)]
    pub success_threshold: Option<u32>,
    #[serde(default)]
    pub repair: Option<RepairDefinition>,
}

/// Probe selected by the `kind` key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeDefinition {
    CpuUsage {
        threshold: f64,
    },
    MemoryUsage {
        threshold: f64,
    },
    DiskUsage {
        path: PathBuf,
        threshold: f64,
    },
    DiskSpace {
        path: PathBuf,
        min_free_bytes: u64,
    },
    ThreadCount {
        max: usize,
    },
    ProcessMemory {
        threshold: f64,
    },
    TempDirCleanup {
        dir: PathBuf,
        max_age_secs: u64,
    },
    Http {
        name: String,
        url: String,
        #[serde(default = "default_http_method")]
        method: String,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default = "default_expected_status")]
        expected_status: u16,
        #[serde(default)]
        expected_body: Option<String>,
    },
    Tcp {
        name: String,
        host: String,
        port: u16,
    },
    Process {
        name: String,
        process: String,
    },
    Database {
        name: String,
        dsn: String,
        #[serde(default = "default_query")]
        query: String,
    },
    File {
        name: String,
        path: PathBuf,
        #[serde(default)]
        max_age_secs: Option<u64>,
    },
    Command {
        name: String,
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        expected_output: Option<String>,
    },
}

/// Repair action attached to a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairDefinition {
    #[serde(flatten)]
    pub action: ActionDefinition,
    /// Statuses that trigger the action
    #[serde(default = "default_repair_statuses")]
    pub on: Vec<HealthStatus>,
}

pub fn default_repair_statuses() -> Vec<HealthStatus> {
    vec![HealthStatus::Unhealthy]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDefinition {
    CleanupFiles {
        directory: PathBuf,
        #[serde(default = "default_glob")]
        pattern: String,
        #[serde(default)]
        older_than_secs: u64,
    },
    RunCommand {
        name: String,
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    RestartService {
        service: String,
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    CreateDirectory {
        path: PathBuf,
    },
    CreateFile {
        path: PathBuf,
        #[serde(default)]
        content: String,
    },
    RotateLog {
        path: PathBuf,
        max_size_bytes: u64,
        #[serde(default = "default_keep")]
        keep: usize,
    },
}

impl ProbeDefinition {
    /// Name the built check will register under
    pub fn check_name(&self) -> String {
        match self {
            Self::CpuUsage { .. } => "cpu_usage".to_string(),
            Self::MemoryUsage { .. } => "memory_usage".to_string(),
            Self::DiskUsage { path, .. } => format!("disk_usage_{}", path.display()),
            Self::DiskSpace { path, .. } => format!("disk_space_{}", path.display()),
            Self::ThreadCount { .. } => "thread_count".to_string(),
            Self::ProcessMemory { .. } => "process_memory".to_string(),
            Self::TempDirCleanup { .. } => "temp_dir_cleanup".to_string(),
            Self::Http { name, .. }
            | Self::Tcp { name, .. }
            | Self::Process { name, .. }
            | Self::Database { name, .. }
            | Self::File { name, .. }
            | Self::Command { name, .. } => name.clone(),
        }
    }

    fn build(&self) -> Result<BaseCheck> {
        let check = match self {
            Self::CpuUsage { threshold } => checks::cpu_usage(*threshold),
            Self::MemoryUsage { threshold } => checks::memory_usage(*threshold),
            Self::DiskUsage { path, threshold } => checks::disk_usage(path.clone(), *threshold),
            Self::DiskSpace {
                path,
                min_free_bytes,
            } => checks::disk_space(path.clone(), *min_free_bytes),
            Self::ThreadCount { max } => checks::thread_count(*max),
            Self::ProcessMemory { threshold } => checks::process_memory(*threshold),
            Self::TempDirCleanup { dir, max_age_secs } => {
                checks::temp_dir_cleanup(dir.clone(), Duration::from_secs(*max_age_secs))
            }
            Self::Http {
                name,
                url,
                method,
                headers,
                expected_status,
                expected_body,
            } => {
                let mut options = checks::HttpCheckOptions::new(name.clone(), url.clone())
                    .with_method(method.clone())
                    .with_expected_status(*expected_status);
                for (key, value) in headers {
                    options = options.with_header(key.clone(), value.clone());
                }
                if let Some(body) = expected_body {
                    options = options.with_expected_body(body.clone());
                }
                checks::http_endpoint(options)?
            }
            Self::Tcp { name, host, port } => checks::tcp_port(name.clone(), host.clone(), *port),
            Self::Process { name, process } => checks::process(name.clone(), process.clone()),
            Self::Database { name, dsn, query } => {
                checks::database(name.clone(), dsn.clone(), query.clone())
            }
            Self::File {
                name,
                path,
                max_age_secs,
            } => checks::file_exists(name.clone(), path.clone(), max_age_secs.map(Duration::from_secs)),
            Self::Command {
                name,
                command,
                args,
                expected_output,
            } => checks::command(
                name.clone(),
                command.clone(),
                args.clone(),
                expected_output.clone(),
            ),
        };
        Ok(check)
    }
}

impl CheckDefinition {
    pub fn check_name(&self) -> String {
        self.probe.check_name()
    }

    /// Build the check with any per-check overrides applied
    pub fn build_check(&self) -> Result<Arc<dyn Check>> {
        let mut check = self.probe.build()?;
        if let Some(secs) = self.timeout_secs {
            check = check.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.interval_secs {
            check = check.with_interval(Duration::from_secs(secs));
        }
        if let Some(threshold) = self.failure_threshold {
            check = check.with_failure_threshold(threshold);
        }
        if let Some(threshold) = self.success_threshold {
            check = check.with_success_threshold(threshold);
        }
        Ok(Arc::new(check))
    }

    /// Build the repair strategy, if the entry declares one
    pub fn build_strategy(&self) -> Result<Option<Arc<dyn RepairStrategy>>> {
        let Some(repair) = &self.repair else {
            return Ok(None);
        };
        let action = repair.action.build()?;
        let strategy = StatusStrategy::new(format!("{}_repair", self.check_name()), action)
            .with_statuses(repair.on.iter().copied());
        Ok(Some(Arc::new(strategy)))
    }
}

impl ActionDefinition {
    pub fn build(&self) -> Result<Arc<dyn RepairAction>> {
        let action = match self {
            Self::CleanupFiles {
                directory,
                pattern,
                older_than_secs,
            } => actions::cleanup_files(
                directory.clone(),
                pattern,
                Duration::from_secs(*older_than_secs),
            )?,
            Self::RunCommand {
                name,
                command,
                args,
            } => actions::run_command(name, command, args.clone()),
            Self::RestartService {
                service,
                command,
                args,
            } => {
                let restart = Arc::new(actions::run_command(
                    &format!("{}_restart_command", service),
                    command,
                    args.clone(),
                ));
                actions::restart_service(service, move || {
                    let restart = restart.clone();
                    async move { restart.execute().await }
                })
            }
            Self::CreateDirectory { path } => actions::create_directory(path.clone()),
            Self::CreateFile { path, content } => {
                actions::create_file(path.clone(), content.clone().into_bytes())
            }
            Self::RotateLog {
                path,
                max_size_bytes,
                keep,
            } => actions::rotate_log(path.clone(), *max_size_bytes, *keep),
        };
        Ok(action.into_arc())
    }
}
