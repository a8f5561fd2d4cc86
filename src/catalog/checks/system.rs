//! Resource probes
//!
//! Each probe owns its `sysinfo` handle; sampling happens on the blocking
//! pool because refreshing reads procfs (and CPU sampling sleeps).

use crate::catalog::SYSTEM_CHECK_TYPE;
use crate::core::health::{BaseCheck, CheckResult};
use crate::utils::error::{HealthError, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use sysinfo::{Disks, ProcessesToUpdate, System};
use tracing::{debug, info};

const SYSTEM_COMPONENT: &str = "system";

/// Run a sampling closure on the blocking pool
async fn sample<F, R>(f: F) -> std::result::Result<R, String>
where
    F: FnOnce() -> Option<R> + Send + 'static,
    R: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err("metric not available on this platform".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn percent_result(metric: &str, value: f64, threshold: f64) -> CheckResult {
    let result = if value > threshold {
        CheckResult::unhealthy(format!(
            "{} too high: {:.2}% > {:.2}%",
            metric, value, threshold
        ))
    } else {
        CheckResult::healthy(format!("{} normal: {:.2}% <= {:.2}%", metric, value, threshold))
    };
    result
        .with_detail("used_percent", value)
        .with_detail("threshold", threshold)
}

fn unavailable(metric: &str, error: String) -> CheckResult {
    CheckResult::unknown(format!("failed to read {}: {}", metric, error)).with_error(error)
}

/// Global CPU usage must stay at or below `threshold` percent
pub fn cpu_usage(threshold: f64) -> BaseCheck {
    let system = Arc::new(Mutex::new(System::new()));
    BaseCheck::new("cpu_usage", SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT)
        .with_timeout(Duration::from_secs(10))
        .with_check(move || {
            let system = system.clone();
            async move {
                let usage = sample(move || {
                    let mut system = system.lock();
                    system.refresh_cpu_usage();
                    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
                    system.refresh_cpu_usage();
                    Some(system.global_cpu_usage() as f64)
                })
                .await;
                match usage {
                    Ok(usage) => percent_result("CPU usage", usage, threshold),
                    Err(e) => unavailable("CPU usage", e),
                }
            }
        })
}

/// Used memory must stay at or below `threshold` percent of total
pub fn memory_usage(threshold: f64) -> BaseCheck {
    let system = Arc::new(Mutex::new(System::new()));
    BaseCheck::new("memory_usage", SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT).with_check(move || {
        let system = system.clone();
        async move {
            let memory = sample(move || {
                let mut system = system.lock();
                system.refresh_memory();
                let total = system.total_memory();
                (total > 0).then(|| (system.used_memory(), total))
            })
            .await;
            match memory {
                Ok((used, total)) => {
                    percent_result("Memory usage", used as f64 / total as f64 * 100.0, threshold)
                        .with_detail("used_bytes", used)
                        .with_detail("total_bytes", total)
                }
                Err(e) => unavailable("memory usage", e),
            }
        }
    })
}

/// Total and available bytes of the disk holding `path`
fn disk_stats(path: &Path) -> Option<(u64, u64, PathBuf)> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| {
            (
                disk.total_space(),
                disk.available_space(),
                disk.mount_point().to_path_buf(),
            )
        })
}

/// Usage of the disk holding `path` must stay at or below `threshold` percent
pub fn disk_usage(path: impl Into<PathBuf>, threshold: f64) -> BaseCheck {
    let path = path.into();
    let name = format!("disk_usage_{}", path.display());
    BaseCheck::new(name, SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT).with_check(move || {
        let path = path.clone();
        async move {
            let probe = path.clone();
            match sample(move || disk_stats(&probe)).await {
                Ok((total, available, mount)) if total > 0 => {
                    let used = total.saturating_sub(available);
                    percent_result("Disk usage", used as f64 / total as f64 * 100.0, threshold)
                        .with_detail("path", path.display().to_string())
                        .with_detail("mount_point", mount.display().to_string())
                        .with_detail("total_bytes", total)
                        .with_detail("free_bytes", available)
                }
                Ok(_) => CheckResult::unknown(format!("disk for {} reports no capacity", path.display())),
                Err(e) => unavailable("disk usage", e),
            }
        }
    })
}

/// The disk holding `path` must keep at least `min_free_bytes` available
pub fn disk_space(path: impl Into<PathBuf>, min_free_bytes: u64) -> BaseCheck {
    let path = path.into();
    let name = format!("disk_space_{}", path.display());
    BaseCheck::new(name, SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT).with_check(move || {
        let path = path.clone();
        async move {
            let probe = path.clone();
            match sample(move || disk_stats(&probe)).await {
                Ok((total, available, _)) => {
                    let result = if available < min_free_bytes {
                        CheckResult::unhealthy(format!(
                            "free space too low: {} < {} bytes",
                            available, min_free_bytes
                        ))
                    } else {
                        CheckResult::healthy(format!(
                            "free space sufficient: {} >= {} bytes",
                            available, min_free_bytes
                        ))
                    };
                    result
                        .with_detail("path", path.display().to_string())
                        .with_detail("free_bytes", available)
                        .with_detail("total_bytes", total)
                        .with_detail("min_free_bytes", min_free_bytes)
                }
                Err(e) => unavailable("disk space", e),
            }
        }
    })
}

/// Thread count of this process must stay at or below `max_threads`
pub fn thread_count(max_threads: usize) -> BaseCheck {
    let system = Arc::new(Mutex::new(System::new()));
    BaseCheck::new("thread_count", SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT).with_check(move || {
        let system = system.clone();
        async move {
            let count = sample(move || {
                let pid = sysinfo::get_current_pid().ok()?;
                let mut system = system.lock();
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                system.process(pid)?.tasks().map(|tasks| tasks.len())
            })
            .await;
            match count {
                Ok(count) => {
                    let result = if count > max_threads {
                        CheckResult::unhealthy(format!("too many threads: {} > {}", count, max_threads))
                    } else {
                        CheckResult::healthy(format!("thread count normal: {} <= {}", count, max_threads))
                    };
                    result
                        .with_detail("thread_count", count)
                        .with_detail("threshold", max_threads)
                }
                Err(e) => unavailable("thread count", e),
            }
        }
    })
}

/// Resident memory of this process must stay at or below `threshold` percent of total
pub fn process_memory(threshold: f64) -> BaseCheck {
    let system = Arc::new(Mutex::new(System::new()));
    BaseCheck::new("process_memory", SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT).with_check(move || {
        let system = system.clone();
        async move {
            let memory = sample(move || {
                let pid = sysinfo::get_current_pid().ok()?;
                let mut system = system.lock();
                system.refresh_memory();
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                let total = system.total_memory();
                let rss = system.process(pid)?.memory();
                (total > 0).then_some((rss, total))
            })
            .await;
            match memory {
                Ok((rss, total)) => percent_result(
                    "Process memory",
                    rss as f64 / total as f64 * 100.0,
                    threshold,
                )
                .with_detail("rss_bytes", rss)
                .with_detail("total_bytes", total),
                Err(e) => unavailable("process memory", e),
            }
        }
    })
}

/// Regular files directly under `dir` last modified more than `max_age` ago
pub(crate) async fn aged_files(dir: &Path, max_age: Duration) -> Result<Vec<PathBuf>> {
    let now = SystemTime::now();
    let mut aged = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age > max_age {
            aged.push(entry.path());
        }
    }
    aged.sort();
    Ok(aged)
}

/// `dir` must hold no file older than `max_age`; recovery deletes them
pub fn temp_dir_cleanup(dir: impl Into<PathBuf>, max_age: Duration) -> BaseCheck {
    let dir = dir.into();
    let check_dir = dir.clone();
    BaseCheck::new("temp_dir_cleanup", SYSTEM_CHECK_TYPE, SYSTEM_COMPONENT)
        .with_timeout(Duration::from_secs(30))
        .with_check(move || {
            let dir = check_dir.clone();
            async move {
                if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
                    return CheckResult::healthy(format!("{} does not exist", dir.display()))
                        .with_detail("temp_dir", dir.display().to_string());
                }
                match aged_files(&dir, max_age).await {
                    Ok(aged) if aged.is_empty() => {
                        CheckResult::healthy(format!("no expired files in {}", dir.display()))
                            .with_detail("temp_dir", dir.display().to_string())
                            .with_detail("max_age_secs", max_age.as_secs())
                    }
                    Ok(aged) => {
                        let names: Vec<String> =
                            aged.iter().map(|path| path.display().to_string()).collect();
                        CheckResult::unhealthy(format!(
                            "{} expired files in {}",
                            aged.len(),
                            dir.display()
                        ))
                        .with_detail("temp_dir", dir.display().to_string())
                        .with_detail("expired_count", aged.len())
                        .with_detail("expired_files", names)
                    }
                    Err(e) => CheckResult::unknown(format!("failed to read {}", dir.display()))
                        .with_error(e),
                }
            }
        })
        .with_recover(move || {
            let dir = dir.clone();
            async move {
                if !tokio::fs::try_exists(&dir).await? {
                    return Ok(());
                }
                let aged = aged_files(&dir, max_age).await?;
                for path in &aged {
                    debug!(path = %path.display(), "Removing expired file");
                    tokio::fs::remove_file(path).await.map_err(|e| {
                        HealthError::action(format!("failed to remove {}: {}", path.display(), e))
                    })?;
                }
                info!(dir = %dir.display(), removed = aged.len(), "Cleaned expired files");
                Ok(())
            }
        })
}
