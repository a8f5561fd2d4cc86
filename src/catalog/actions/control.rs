//! Process and control-flow actions

use crate::core::repair::FnAction;
use crate::utils::error::recovery::{RetryConfig, RetryPolicy, catch_panic};
use crate::utils::error::{HealthError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

/// Restart a service through a caller-supplied closure
pub fn restart_service<F, Fut>(service: &str, restart: F) -> FnAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let service_name = service.to_string();
    let restart = Arc::new(restart);
    FnAction::new(
        format!("restart_service_{}", service),
        format!("restart service {}", service),
        move || {
            let restart = restart.clone();
            let service = service_name.clone();
            async move {
                info!(service = %service, "Restarting service");
                (*restart)().await
            }
        },
    )
}

/// Stop then start a component, pausing in between
pub fn restart_component<S, SFut, T, TFut>(
    component: &str,
    stop: S,
    start: T,
    pause: Duration,
) -> FnAction
where
    S: Fn() -> SFut + Send + Sync + 'static,
    SFut: Future<Output = Result<()>> + Send + 'static,
    T: Fn() -> TFut + Send + Sync + 'static,
    TFut: Future<Output = Result<()>> + Send + 'static,
{
    let name = component.to_string();
    let stop = Arc::new(stop);
    let start = Arc::new(start);
    FnAction::new(
        format!("restart_component_{}", component),
        format!("stop and start component {}", component),
        move || {
            let stop = stop.clone();
            let start = start.clone();
            let component = name.clone();
            async move {
                (*stop)().await.map_err(|e| {
                    HealthError::action(format!("failed to stop component {}: {}", component, e))
                })?;
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
                (*start)().await.map_err(|e| {
                    HealthError::action(format!("failed to start component {}: {}", component, e))
                })?;
                info!(component = %component, "Component restarted");
                Ok(())
            }
        },
    )
}

/// Run a program; a non-zero exit is a failure
pub fn run_command(name: &str, program: &str, args: Vec<String>) -> FnAction {
    let program = program.to_string();
    FnAction::new(
        name,
        format!("run {} {}", program, args.join(" ")),
        move || {
            let program = program.clone();
            let args = args.clone();
            async move {
                let output = Command::new(&program)
                    .args(&args)
                    .kill_on_drop(true)
                    .output()
                    .await?;
                if output.status.success() {
                    Ok(())
                } else {
                    Err(HealthError::action(format!(
                        "{} exited with {}: {}",
                        program,
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    )))
                }
            }
        },
    )
}

/// Retry an operation with backoff until it succeeds or attempts run out
pub fn retry<F, Fut>(name: &str, operation: F, config: RetryConfig) -> FnAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let operation = Arc::new(operation);
    let policy = RetryPolicy::new(config);
    FnAction::new(
        name,
        format!("retry up to {} times", policy.config().max_attempts.max(1)),
        move || {
            let operation = operation.clone();
            let policy = policy.clone();
            async move { policy.call(|| (*operation)()).await }
        },
    )
}

/// Run an operation, turning a panic into an error
pub fn recover_panic<F, Fut>(name: &str, operation: F) -> FnAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let operation = Arc::new(operation);
    FnAction::new(name, "run with panic recovery", move || {
        let operation = operation.clone();
        async move {
            catch_panic((*operation)()).await.and_then(|outcome| outcome)
        }
    })
}

/// Releases cached memory and reports how many bytes it freed
pub type MemoryReleaser = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Run every registered memory releaser
///
/// There is no collector to force, so freeing memory means asking the owners
/// of caches and pools to shrink.
pub fn free_memory(releasers: Vec<MemoryReleaser>) -> FnAction {
    FnAction::new("free_memory", "release cached memory", move || {
        let releasers = releasers.clone();
        async move {
            if releasers.is_empty() {
                warn!("No memory releasers registered");
                return Ok(());
            }
            let freed: u64 = releasers.iter().map(|release| release()).sum();
            info!(releasers = releasers.len(), freed_bytes = freed, "Released memory");
            Ok(())
        }
    })
}
