//! Per-target control loop

use super::config::TriggerMode;
use super::monitor::{MonitorShared, TargetState};
use super::status::CheckerStatus;
use crate::core::health::evaluate;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Loop for one target until `token` is cancelled or the check disappears
pub(super) async fn run_target(shared: Arc<MonitorShared>, name: String, token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(shared.config.initial_delay) => {}
    }

    let mut ticker = tokio::time::interval(shared.config.check_interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let status = tokio::select! {
            _ = token.cancelled() => break,
            status = shared.tick(&name) => status,
        };

        if status.is_none() {
            warn!(check = %name, "Health check no longer registered, stopping its loop");
            break;
        }
    }

    debug!(check = %name, "Monitor loop exited");
}

impl MonitorShared {
    fn thresholds(&self, failure: u32, success: u32) -> (u32, u32) {
        if self.config.per_check_thresholds {
            (failure.max(1), success.max(1))
        } else {
            (
                self.config.failure_threshold.max(1),
                self.config.success_threshold.max(1),
            )
        }
    }

    /// Evaluate once, update the status and repair when the trigger fires
    pub(super) async fn tick(&self, name: &str) -> Option<CheckerStatus> {
        let check = self.registry.get(name)?;
        let (failure_threshold, success_threshold) =
            self.thresholds(check.failure_threshold(), check.success_threshold());
        let result = evaluate(check.as_ref()).await;

        let repair_due = {
            let mut targets = self.targets.write();
            let target = targets
                .entry(name.to_string())
                .or_insert_with(|| TargetState::new(name));

            target.status.apply(&result);
            target.history.push_back(result.clone());
            let limit = self.history_limit.load(Ordering::Acquire);
            while target.history.len() > limit {
                target.history.pop_front();
            }

            let status = &target.status;
            debug!(
                check = %name,
                status = %status.status,
                consecutive_failures = status.consecutive_failures,
                consecutive_successes = status.consecutive_successes,
                "Monitor tick"
            );

            if status.consecutive_failures >= failure_threshold {
                if !target.incident {
                    warn!(
                        check = %name,
                        failures = status.consecutive_failures,
                        threshold = failure_threshold,
                        message = %status.message,
                        "Failure threshold reached"
                    );
                }
                target.incident = true;
            } else if status.consecutive_successes >= success_threshold && target.incident {
                info!(check = %name, successes = status.consecutive_successes, "Health check recovered");
                target.incident = false;
                target.fired = false;
            }

            let reached = self.config.auto_repair && target.status.consecutive_failures >= failure_threshold;
            match self.config.trigger_mode {
                TriggerMode::Level => reached,
                TriggerMode::Edge if reached && !target.fired => {
                    target.fired = true;
                    true
                }
                TriggerMode::Edge => false,
            }
        };

        if repair_due {
            self.auto_repair(name).await;
        }

        self.targets.read().get(name).map(|target| target.status.clone())
    }

    async fn auto_repair(&self, name: &str) {
        info!(check = %name, "Triggering automatic repair");
        let outcome = self.healer.check_and_repair(name).await;
        let now = chrono::Utc::now();

        let mut targets = self.targets.write();
        let Some(target) = targets.get_mut(name) else {
            return;
        };
        match outcome {
            Ok(outcome) => {
                if let Some(repair) = &outcome.repair {
                    info!(
                        check = %name,
                        action = %repair.action_name,
                        status_after = %outcome.check_result.status,
                        "Automatic repair finished"
                    );
                }
                target.status.record_repair(now, outcome.repair, None);
            }
            Err(e) => {
                error!(check = %name, error = %e, "Automatic repair failed");
                target
                    .status
                    .record_repair(now, e.repair_result().cloned(), Some(e.to_string()));
            }
        }
    }
}
