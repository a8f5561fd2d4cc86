//! Reduction of many verdicts into one
//!
//! Both reducers are order independent: messages and errors are sorted before
//! they are joined, so the same input set always yields the same output.

use super::types::{CheckResult, HealthStatus};
use std::collections::HashMap;

/// Reduce check results with the precedence Unhealthy > Degraded > Healthy
///
/// An empty input yields `Unknown`. The aggregate carries an error whenever
/// any contributing result does, whatever the overall status.
pub fn aggregate(results: &[CheckResult]) -> CheckResult {
    if results.is_empty() {
        return CheckResult::unknown("no checks performed");
    }

    let status = if results.iter().any(|r| r.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if results.iter().any(|r| r.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let message = match status {
        HealthStatus::Healthy => "all checks healthy".to_string(),
        _ => format!(
            "system is {}: {}",
            status,
            sorted_join(results.iter().filter(|r| r.status == status).map(|r| r.message.as_str()))
        ),
    };

    let details: HashMap<String, serde_json::Value> = results
        .iter()
        .map(|r| {
            let details = serde_json::to_value(&r.details).unwrap_or(serde_json::Value::Null);
            (r.message.clone(), details)
        })
        .collect();

    let error = {
        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| {
                r.error.as_ref().map(|e| {
                    if r.check_name.is_empty() {
                        e.clone()
                    } else {
                        format!("{}: {}", r.check_name, e)
                    }
                })
            })
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(format!(
                "health check errors: {}",
                sorted_join(errors.iter().map(String::as_str))
            ))
        }
    };

    let mut aggregate = CheckResult::new(status, message);
    aggregate.details = details;
    aggregate.error = error;
    aggregate.duration = results.iter().map(|r| r.duration).max().unwrap_or_default();
    aggregate
}

/// Reduce bare statuses
///
/// Unhealthy > Degraded > Healthy, except that `Unknown` wins only when every
/// input is `Unknown` (or there is no input at all).
pub fn aggregate_statuses<I>(statuses: I) -> HealthStatus
where
    I: IntoIterator<Item = HealthStatus>,
{
    let mut saw_any = false;
    let mut all_unknown = true;
    let mut worst = HealthStatus::Healthy;

    for status in statuses {
        saw_any = true;
        match status {
            HealthStatus::Unhealthy => return HealthStatus::Unhealthy,
            HealthStatus::Degraded => {
                all_unknown = false;
                worst = HealthStatus::Degraded;
            }
            HealthStatus::Healthy => all_unknown = false,
            HealthStatus::Unknown => {}
        }
    }

    if !saw_any || all_unknown {
        HealthStatus::Unknown
    } else {
        worst
    }
}

fn sorted_join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut items: Vec<&str> = items.collect();
    items.sort_unstable();
    items.join("; ")
}
