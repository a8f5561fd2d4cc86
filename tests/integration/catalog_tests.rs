//! Built-in catalog integration tests
//!
//! Built-in checks paired with built-in actions, driven by the healer and
//! the monitor against real files, sockets and an HTTP mock.

#[cfg(test)]
mod tests {
    use crate::common::assertions::CheckerStatusAssertions;
    use crate::common::fixtures::fast_monitor_config;
    use selfheal::catalog::{actions, checks};
    use selfheal::core::health::{BaseCheck, CheckRegistry, CheckResult, HealthStatus};
    use selfheal::utils::error::RetryConfig;
    use selfheal::{HealthError, HealthMonitor, SelfHealer, StatusStrategy};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn healer() -> (Arc<CheckRegistry>, Arc<SelfHealer>) {
        let registry = Arc::new(CheckRegistry::new());
        let healer = Arc::new(SelfHealer::new(registry.clone()));
        (registry, healer)
    }

    #[tokio::test]
    async fn test_missing_file_recreated() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("state").join("ready");
        let (registry, healer) = healer();

        assert_ok!(registry.register(Arc::new(checks::file_exists("ready_marker", &marker, None))));
        let create_parent = actions::create_directory(dir.path().join("state"));
        let create_marker = actions::create_file(&marker, "ok");
        let steps = Arc::new((create_parent, create_marker));
        let action = selfheal::FnAction::new("restore_marker", "recreate the marker", move || {
            let steps = steps.clone();
            async move {
                use selfheal::RepairAction;
                steps.0.execute().await?;
                steps.1.execute().await
            }
        });
        healer.register_strategy(
            "ready_marker",
            Arc::new(StatusStrategy::new("restore", action.into_arc())),
        );

        let outcome = assert_ok!(healer.check_and_repair("ready_marker").await);
        assert_eq!(outcome.check_result.status, HealthStatus::Healthy);
        assert_eq!(tokio::fs::read_to_string(&marker).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_temp_dir_cleanup_heals_itself() {
        let dir = TempDir::new().unwrap();
        for name in ["a.tmp", "b.tmp"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(30)).await;

        let (registry, healer) = healer();
        assert_ok!(registry.register(Arc::new(checks::temp_dir_cleanup(
            dir.path(),
            Duration::from_millis(1)
        ))));

        let before = registry.run_check("temp_dir_cleanup").await.unwrap();
        assert_eq!(before.status, HealthStatus::Unhealthy);
        assert_eq!(before.details["expired_count"], serde_json::json!(2));

        let result = assert_ok!(healer.heal_by_name("temp_dir_cleanup").await);
        assert!(result.success);

        let after = registry.run_check("temp_dir_cleanup").await.unwrap();
        assert_eq!(after.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_monitor_cleans_log_directory() {
        let dir = TempDir::new().unwrap();
        for name in ["1.log", "2.log", "3.log", "keep.txt"] {
            tokio::fs::write(dir.path().join(name), b"data").await.unwrap();
        }

        let (registry, healer) = healer();
        let watched = dir.path().to_path_buf();
        let check = BaseCheck::new("log_dir", "system", "storage").with_check(move || {
            let watched = watched.clone();
            async move {
                let mut entries = match tokio::fs::read_dir(&watched).await {
                    Ok(entries) => entries,
                    Err(e) => return CheckResult::unknown("unreadable").with_error(e),
                };
                let mut count = 0;
                while let Ok(Some(_)) = entries.next_entry().await {
                    count += 1;
                }
                if count > 2 {
                    CheckResult::unhealthy(format!("{} files", count))
                } else {
                    CheckResult::healthy(format!("{} files", count))
                }
            }
        });
        assert_ok!(registry.register(Arc::new(check)));

        let cleanup = assert_ok!(actions::cleanup_files(dir.path(), "*.log", Duration::ZERO));
        healer.register_strategy(
            "log_dir",
            Arc::new(StatusStrategy::new("cleanup", cleanup.into_arc())),
        );

        let monitor = HealthMonitor::new(registry, healer, fast_monitor_config(1));
        let status = assert_ok!(monitor.check_now("log_dir").await);
        status.assert_repaired(true);

        assert!(!dir.path().join("1.log").exists());
        assert!(dir.path().join("keep.txt").exists());

        let status = assert_ok!(monitor.check_now("log_dir").await);
        status.assert_status(HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_http_endpoint_recovers_after_restart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .with_priority(2)
            .mount(&server)
            .await;

        let (registry, healer) = healer();
        let check = assert_ok!(checks::http_endpoint(
            checks::HttpCheckOptions::new("api", format!("{}/health", server.uri()))
                .with_timeout(Duration::from_secs(2))
        ));
        assert_ok!(registry.register(Arc::new(check)));

        let stops = Arc::new(AtomicU32::new(0));
        let starts = Arc::new(AtomicU32::new(0));
        let (stop_count, start_count) = (stops.clone(), starts.clone());
        let restart = actions::restart_component(
            "api",
            move || {
                let stop_count = stop_count.clone();
                async move {
                    stop_count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
            move || {
                let start_count = start_count.clone();
                async move {
                    start_count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
            Duration::from_millis(10),
        );
        healer.register_strategy("api", Arc::new(StatusStrategy::new("restart", restart.into_arc())));

        let outcome = assert_ok!(healer.check_and_repair("api").await);
        assert_eq!(outcome.check_result.status, HealthStatus::Healthy);
        assert_eq!(outcome.repair.unwrap().action_name, "restart_component_api");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tcp_port_follows_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let registry = CheckRegistry::new();
        assert_ok!(registry.register(Arc::new(checks::tcp_port("local", "127.0.0.1", port))));

        assert_eq!(registry.run_check("local").await.unwrap().status, HealthStatus::Healthy);

        drop(listener);
        assert_eq!(registry.run_check("local").await.unwrap().status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_retry_action_in_strategy() {
        let (registry, healer) = healer();
        assert_ok!(registry.register(Arc::new(
            BaseCheck::new("flaky", "custom", "tests")
                .with_check(|| async { CheckResult::unhealthy("still broken") })
        )));

        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let action = actions::retry(
            "reconnect",
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(HealthError::action("connection refused"))
                    } else {
                        Ok(())
                    }
                }
            },
            RetryConfig::fixed(5, Duration::from_millis(5)),
        );
        healer.register_strategy("flaky", Arc::new(StatusStrategy::new("reconnect", action.into_arc())));

        let outcome = assert_ok!(healer.check_and_repair("flaky").await);
        assert!(outcome.repair.unwrap().success);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // The action succeeded but the check still reports the problem
        assert_eq!(outcome.check_result.status, HealthStatus::Unhealthy);
    }
}
