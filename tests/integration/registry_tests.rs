//! Registry and aggregation integration tests

#[cfg(test)]
mod tests {
    use crate::common::ScriptedCheck;
    use selfheal::core::health::{BaseCheck, CheckRegistry, CheckResult, CompositeCheck, HealthStatus};
    use selfheal::{Check, HealthError, aggregate};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn registry_with(checks: Vec<ScriptedCheck>) -> CheckRegistry {
        let registry = CheckRegistry::new();
        for check in checks {
            assert_ok!(registry.register(Arc::new(check)));
        }
        registry
    }

    #[tokio::test]
    async fn test_system_status_worst_wins() {
        let registry = registry_with(vec![
            ScriptedCheck::constant("api", HealthStatus::Healthy),
            ScriptedCheck::constant("cache", HealthStatus::Degraded),
            ScriptedCheck::constant("db", HealthStatus::Healthy),
        ]);

        let status = registry.system_status().await;
        assert_eq!(status.status, HealthStatus::Degraded);
        assert!(status.message.contains("scripted degraded"));

        assert_ok!(registry.register(Arc::new(ScriptedCheck::constant("disk", HealthStatus::Unhealthy))));
        let status = registry.system_status().await;
        assert_eq!(status.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_empty_registry_is_unknown() {
        let registry = CheckRegistry::new();
        let status = registry.system_status().await;
        assert_eq!(status.status, HealthStatus::Unknown);
        assert!(registry.run_checks().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_unregister_cycle() {
        let registry = registry_with(vec![ScriptedCheck::constant("api", HealthStatus::Healthy)]);

        let error = assert_err!(registry.register(Arc::new(ScriptedCheck::constant(
            "api",
            HealthStatus::Unhealthy
        ))));
        assert!(matches!(error, HealthError::AlreadyExists(_)));
        // The original registration survives the rejected duplicate
        let result = registry.run_check("api").await.unwrap();
        assert_eq!(result.status, HealthStatus::Healthy);

        assert_ok!(registry.unregister("api"));
        assert!(registry.run_check("api").await.is_none());
        assert!(assert_err!(registry.unregister("api")).is_not_found());
    }

    #[tokio::test]
    async fn test_filters_by_type_and_component() {
        let registry = registry_with(vec![
            ScriptedCheck::constant("a", HealthStatus::Healthy).with_component("storage"),
            ScriptedCheck::constant("b", HealthStatus::Healthy).with_component("network"),
            ScriptedCheck::constant("c", HealthStatus::Healthy).with_component("storage"),
        ]);

        let mut storage: Vec<String> = registry
            .get_by_component("storage")
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        storage.sort();
        assert_eq!(storage, vec!["a", "c"]);
        assert_eq!(registry.get_by_type("scripted").len(), 3);
        assert!(registry.get_by_type("system").is_empty());
    }

    #[tokio::test]
    async fn test_run_checks_stamps_metadata() {
        let registry = registry_with(vec![
            ScriptedCheck::constant("api", HealthStatus::Healthy).with_component("edge"),
        ]);

        let results = registry.run_checks().await;
        let result = &results["api"];
        assert_eq!(result.check_name, "api");
        assert_eq!(result.check_type, "scripted");
        assert_eq!(result.component, "edge");
    }

    #[tokio::test]
    async fn test_slow_check_is_bounded_and_isolated() {
        let registry = registry_with(vec![
            ScriptedCheck::constant("slow", HealthStatus::Healthy).with_delay(Duration::from_secs(5)),
            ScriptedCheck::constant("fast", HealthStatus::Healthy),
        ]);

        let started = Instant::now();
        let results = registry.run_checks().await;
        assert!(started.elapsed() < Duration::from_secs(3));

        assert_eq!(results["fast"].status, HealthStatus::Healthy);
        assert_eq!(results["slow"].status, HealthStatus::Unhealthy);
        assert!(results["slow"].error.is_some());
    }

    fn explode() -> CheckResult {
        panic!("probe exploded")
    }

    #[tokio::test]
    async fn test_panicking_check_does_not_escape() {
        let registry = CheckRegistry::new();
        assert_ok!(registry.register(Arc::new(
            BaseCheck::new("bomb", "custom", "tests").with_check(|| async { explode() })
        )));
        assert_ok!(registry.register(Arc::new(ScriptedCheck::constant("ok", HealthStatus::Healthy))));

        let results = registry.run_checks().await;
        assert_eq!(results["bomb"].status, HealthStatus::Unhealthy);
        assert!(results["bomb"].error.as_deref().unwrap_or_default().contains("probe exploded"));
        assert_eq!(results["ok"].status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_composite_check_in_registry() {
        let composite = CompositeCheck::new("backend", "composite", "backend")
            .with_child(Arc::new(ScriptedCheck::constant("db", HealthStatus::Healthy)))
            .with_child(Arc::new(ScriptedCheck::constant("queue", HealthStatus::Degraded)));

        let registry = CheckRegistry::new();
        assert_ok!(registry.register(Arc::new(composite)));

        let result = registry.run_check("backend").await.unwrap();
        assert_eq!(result.status, HealthStatus::Degraded);
        assert_eq!(result.check_name, "backend");
    }

    #[test]
    fn test_registry_usable_from_sync_code() {
        let registry = CheckRegistry::new();
        assert_ok!(registry.register(Arc::new(ScriptedCheck::constant("api", HealthStatus::Healthy))));

        let result = tokio_test::block_on(registry.run_check("api")).unwrap();
        assert_eq!(result.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let results = vec![
            CheckResult::healthy("a"),
            CheckResult::unhealthy("b"),
            CheckResult::degraded("c"),
        ];
        let mut reversed = results.clone();
        reversed.reverse();

        let forward = aggregate(&results);
        let backward = aggregate(&reversed);
        assert_eq!(forward.status, HealthStatus::Unhealthy);
        assert_eq!(forward.status, backward.status);
        assert_eq!(forward.message, backward.message);
    }
}
