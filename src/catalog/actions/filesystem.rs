//! Filesystem actions

use crate::core::repair::FnAction;
use crate::utils::error::{HealthError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Create a directory and its parents
pub fn create_directory(path: impl Into<PathBuf>) -> FnAction {
    let path = path.into();
    FnAction::new(
        format!("create_directory_{}", path.display()),
        format!("create directory {}", path.display()),
        move || {
            let path = path.clone();
            async move {
                tokio::fs::create_dir_all(&path).await?;
                Ok(())
            }
        },
    )
}

/// Write `content` to `path`, creating parent directories
pub fn create_file(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> FnAction {
    let path = path.into();
    let content = content.into();
    FnAction::new(
        format!("create_file_{}", path.display()),
        format!("create file {}", path.display()),
        move || {
            let path = path.clone();
            let content = content.clone();
            async move {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, content).await?;
                Ok(())
            }
        },
    )
}

fn rotated(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Rotate `path` once it reaches `max_size` bytes, keeping `keep` old files
///
/// `app.log` becomes `app.log.1`, `app.log.1` becomes `app.log.2` and so on;
/// the oldest beyond `keep` is dropped and an empty `app.log` is created.
pub fn rotate_log(path: impl Into<PathBuf>, max_size: u64, keep: usize) -> FnAction {
    let path = path.into();
    FnAction::new(
        format!("rotate_log_{}", path.display()),
        format!(
            "rotate {} (max {} bytes, keep {})",
            path.display(),
            max_size,
            keep
        ),
        move || {
            let path = path.clone();
            async move {
                let metadata = match tokio::fs::metadata(&path).await {
                    Ok(metadata) => metadata,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                    Err(e) => return Err(e.into()),
                };
                if metadata.len() < max_size {
                    return Ok(());
                }

                let keep = keep.max(1);
                let oldest = rotated(&path, keep);
                if tokio::fs::try_exists(&oldest).await? {
                    tokio::fs::remove_file(&oldest).await?;
                }
                for index in (1..keep).rev() {
                    let from = rotated(&path, index);
                    if tokio::fs::try_exists(&from).await? {
                        tokio::fs::rename(&from, rotated(&path, index + 1)).await?;
                    }
                }
                tokio::fs::rename(&path, rotated(&path, 1)).await?;
                tokio::fs::File::create(&path).await?;

                info!(path = %path.display(), size = metadata.len(), "Rotated log file");
                Ok(())
            }
        },
    )
}

/// Delete files in `dir` whose name matches `pattern` and that are older than `older_than`
pub fn cleanup_files(dir: impl Into<PathBuf>, pattern: &str, older_than: Duration) -> Result<FnAction> {
    let dir = dir.into();
    let glob = Pattern::new(pattern)
        .map_err(|e| HealthError::config(format!("invalid glob '{}': {}", pattern, e)))?;
    Ok(FnAction::new(
        format!("cleanup_files_{}", dir.display()),
        format!(
            "delete {} in {} older than {}s",
            pattern,
            dir.display(),
            older_than.as_secs()
        ),
        move || {
            let dir = dir.clone();
            let glob = glob.clone();
            async move {
                let now = SystemTime::now();
                let mut removed = 0usize;
                let mut entries = match tokio::fs::read_dir(&dir).await {
                    Ok(entries) => entries,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                    Err(e) => return Err(e.into()),
                };

                while let Some(entry) = entries.next_entry().await? {
                    let file_name = entry.file_name();
                    if !glob.matches(&file_name.to_string_lossy()) {
                        continue;
                    }
                    let metadata = entry.metadata().await?;
                    if !metadata.is_file() {
                        continue;
                    }
                    let age = metadata
                        .modified()
                        .ok()
                        .and_then(|modified| now.duration_since(modified).ok())
                        .unwrap_or_default();
                    if age < older_than {
                        continue;
                    }
                    debug!(path = %entry.path().display(), "Removing file");
                    tokio::fs::remove_file(entry.path()).await?;
                    removed += 1;
                }

                info!(dir = %dir.display(), removed, "Cleaned up files");
                Ok(())
            }
        },
    ))
}
