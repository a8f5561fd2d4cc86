//! Health monitor integration tests

#[cfg(test)]
mod tests {
    use crate::common::assertions::CheckerStatusAssertions;
    use crate::common::fixtures::fast_monitor_config;
    use crate::common::{CountingAction, ScriptedCheck, ToggleCheck, wait_until};
    use selfheal::core::health::{CheckRegistry, HealthStatus};
    use selfheal::{HealthMonitor, MonitorConfig, SelfHealer, StatusStrategy, TriggerMode};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    struct Setup {
        registry: Arc<CheckRegistry>,
        healer: Arc<SelfHealer>,
        monitor: HealthMonitor,
    }

    fn setup(config: MonitorConfig) -> Setup {
        let registry = Arc::new(CheckRegistry::new());
        let healer = Arc::new(SelfHealer::new(registry.clone()));
        let monitor = HealthMonitor::new(registry.clone(), healer.clone(), config);
        Setup {
            registry,
            healer,
            monitor,
        }
    }

    /// An unhealthy toggle check bound to an action that does not fix it
    fn stubborn(s: &Setup) -> (Arc<ToggleCheck>, Arc<CountingAction>) {
        let check = Arc::new(ToggleCheck::new("svc", false));
        assert_ok!(s.registry.register(check.clone()));
        let action = Arc::new(CountingAction::new("poke"));
        s.healer
            .register_strategy("svc", Arc::new(StatusStrategy::new("poke", action.clone())));
        (check, action)
    }

    #[tokio::test]
    async fn test_loop_detects_and_repairs() {
        let s = setup(fast_monitor_config(2));
        let check = Arc::new(ToggleCheck::new("svc", false));
        assert_ok!(s.registry.register(check.clone()));
        s.healer
            .register_strategy("svc", Arc::new(StatusStrategy::new("fix", check.fixer("set_flag"))));

        s.monitor.start();
        let healed = wait_until(Duration::from_secs(3), || {
            s.monitor
                .get_status("svc")
                .is_some_and(|status| status.status == HealthStatus::Healthy)
        })
        .await;
        assert!(healed, "monitor never repaired svc");

        let status = s.monitor.get_status("svc").unwrap();
        status.assert_repaired(true);
        assert!(status.total_failures >= 2);
        assert_eq!(s.monitor.get_system_health(), HealthStatus::Healthy);
        assert_eq!(s.healer.get_heal_history("svc").unwrap().success_heals, 1);

        s.monitor.stop().await;
        assert!(!s.monitor.is_running());
        assert!(s.monitor.get_all_status().is_empty());
    }

    #[tokio::test]
    async fn test_level_trigger_repeats() {
        let s = setup(fast_monitor_config(2));
        let (_check, action) = stubborn(&s);

        for _ in 0..4 {
            assert_ok!(s.monitor.check_now("svc").await);
        }
        // Fires on ticks 2, 3 and 4
        assert_eq!(action.runs(), 3);
    }

    #[tokio::test]
    async fn test_edge_trigger_fires_once_per_incident() {
        let s = setup(MonitorConfig {
            trigger_mode: TriggerMode::Edge,
            ..fast_monitor_config(2)
        });
        let (check, action) = stubborn(&s);

        for _ in 0..4 {
            assert_ok!(s.monitor.check_now("svc").await);
        }
        assert_eq!(action.runs(), 1);

        check.set_healthy(true);
        let status = assert_ok!(s.monitor.check_now("svc").await);
        status.assert_status(HealthStatus::Healthy);

        check.set_healthy(false);
        for _ in 0..2 {
            assert_ok!(s.monitor.check_now("svc").await);
        }
        assert_eq!(action.runs(), 2);
    }

    #[tokio::test]
    async fn test_failed_repair_visible_in_status() {
        let s = setup(fast_monitor_config(1));
        assert_ok!(s.registry.register(Arc::new(ScriptedCheck::constant("db", HealthStatus::Unhealthy))));
        s.healer.register_strategy(
            "db",
            Arc::new(StatusStrategy::new(
                "restart",
                Arc::new(CountingAction::new("restart_db").failing()),
            )),
        );

        let status = assert_ok!(s.monitor.check_now("db").await);
        status.assert_status(HealthStatus::Unhealthy);
        status.assert_repaired(false);
        assert!(status.last_repair_error.unwrap().contains("restart_db failed"));
    }

    #[tokio::test]
    async fn test_auto_repair_disabled() {
        let s = setup(MonitorConfig {
            auto_repair: false,
            ..fast_monitor_config(1)
        });
        let (_check, action) = stubborn(&s);

        for _ in 0..3 {
            assert_ok!(s.monitor.check_now("svc").await);
        }
        let status = s.monitor.get_status("svc").unwrap();
        assert_eq!(status.consecutive_failures, 3);
        assert!(status.last_repair.is_none());
        assert_eq!(action.runs(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_watch_and_unwatch() {
        let s = setup(fast_monitor_config(3));
        s.monitor.start();

        let check = Arc::new(ScriptedCheck::constant("late", HealthStatus::Healthy));
        assert_ok!(s.registry.register(check.clone()));
        assert!(s.monitor.watch("missing").unwrap_err().is_not_found());
        assert_ok!(s.monitor.watch("late"));

        assert!(wait_until(Duration::from_secs(2), || check.calls() >= 2).await);
        assert_eq!(
            s.monitor.get_status("late").unwrap().status,
            HealthStatus::Healthy
        );

        assert_ok!(s.monitor.unwatch("late").await);
        assert!(s.monitor.get_status("late").is_none());
        let calls = check.calls();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(check.calls(), calls);

        s.monitor.stop().await;
    }

    #[tokio::test]
    async fn test_slow_target_does_not_delay_others() {
        let s = setup(fast_monitor_config(3));
        let slow = Arc::new(
            ScriptedCheck::constant("slow", HealthStatus::Healthy).with_delay(Duration::from_millis(400)),
        );
        let fast = Arc::new(ScriptedCheck::constant("fast", HealthStatus::Healthy));
        assert_ok!(s.registry.register(slow.clone()));
        assert_ok!(s.registry.register(fast.clone()));

        s.monitor.start();
        assert!(wait_until(Duration::from_millis(300), || fast.calls() >= 5).await);
        assert!(slow.calls() <= 1);

        let started = Instant::now();
        s.monitor.stop().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_status_history_is_bounded() {
        let s = setup(MonitorConfig {
            status_history_limit: 3,
            ..fast_monitor_config(10)
        });
        assert_ok!(s.registry.register(Arc::new(ScriptedCheck::new(
            "svc",
            [
                HealthStatus::Healthy,
                HealthStatus::Degraded,
                HealthStatus::Unhealthy,
                HealthStatus::Healthy,
                HealthStatus::Degraded,
            ],
            HealthStatus::Healthy,
        ))));

        for _ in 0..5 {
            assert_ok!(s.monitor.check_now("svc").await);
        }
        let history: Vec<HealthStatus> = s
            .monitor
            .get_status_history("svc")
            .iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(
            history,
            vec![HealthStatus::Unhealthy, HealthStatus::Healthy, HealthStatus::Degraded]
        );

        s.monitor.set_status_history_limit(1);
        assert_eq!(s.monitor.get_status_history("svc").len(), 1);
    }

    #[tokio::test]
    async fn test_system_health_over_targets() {
        let s = setup(fast_monitor_config(10));
        assert_eq!(s.monitor.get_system_health(), HealthStatus::Unknown);

        assert_ok!(s.registry.register(Arc::new(ScriptedCheck::constant("a", HealthStatus::Healthy))));
        assert_ok!(s.registry.register(Arc::new(ScriptedCheck::constant("b", HealthStatus::Degraded))));
        assert_ok!(s.monitor.check_now("a").await);
        assert_ok!(s.monitor.check_now("b").await);
        assert_eq!(s.monitor.get_system_health(), HealthStatus::Degraded);

        assert!(s.monitor.check_now("zzz").await.unwrap_err().is_not_found());
    }
}
