//! Configuration-to-engine integration tests

#[cfg(test)]
mod tests {
    use crate::common::wait_until;
    use selfheal::core::health::HealthStatus;
    use selfheal::{EngineConfig, HealthEngine, TriggerMode};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn marker_config(dir: &Path) -> String {
        format!(
            r#"
monitor:
  check_interval_secs: 1
  initial_delay_secs: 0
  failure_threshold: 1
  trigger: edge
healer:
  history_limit: 5
checks:
  - kind: file
    name: marker
    path: {marker}
    repair:
      kind: create_file
      path: {marker}
      content: restored
"#,
            marker = dir.join("marker").display()
        )
    }

    async fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("selfheal.yaml");
        tokio::fs::write(&path, body).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_file_config_builds_engine() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &marker_config(dir.path())).await;

        let config = assert_ok!(EngineConfig::from_file(&path).await);
        assert_eq!(config.monitor.trigger, TriggerMode::Edge);

        let engine = assert_ok!(HealthEngine::from_config(config));
        assert_eq!(engine.registry().names(), vec!["marker"]);
        assert!(engine.healer().get_strategy("marker").is_some());
        assert_eq!(engine.monitor().config().failure_threshold, 1);
    }

    #[tokio::test]
    async fn test_run_once_applies_configured_repair() {
        let dir = TempDir::new().unwrap();
        let config = assert_ok!(EngineConfig::from_yaml_str(&marker_config(dir.path())));
        let engine = assert_ok!(HealthEngine::from_config(config));

        let report = engine.run_once().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.repairs["marker"].success);
        assert_eq!(
            tokio::fs::read_to_string(dir.path().join("marker")).await.unwrap(),
            "restored"
        );
        assert_eq!(engine.healer().get_heal_stats().total_heals, 1);
    }

    #[tokio::test]
    async fn test_engine_loop_repairs_from_config() {
        let dir = TempDir::new().unwrap();
        let config = assert_ok!(EngineConfig::from_yaml_str(&marker_config(dir.path())));
        let engine = assert_ok!(HealthEngine::from_config(config));

        engine.start();
        let marker = dir.path().join("marker");
        assert!(wait_until(Duration::from_secs(3), || marker.exists()).await);
        assert!(
            wait_until(Duration::from_secs(3), || {
                engine
                    .monitor()
                    .get_status("marker")
                    .is_some_and(|status| status.last_repair.is_some())
            })
            .await
        );
        engine.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_once_reports_unrepaired_failure() {
        let yaml = r#"
checks:
  - kind: command
    name: always_fails
    command: "false"
    repair:
      kind: run_command
      name: also_fails
      command: "false"
"#;
        let engine = assert_ok!(HealthEngine::from_config(assert_ok!(EngineConfig::from_yaml_str(yaml))));

        let report = engine.run_once().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!report.is_healthy());
        assert!(!report.repairs["always_fails"].success);
        assert!(report.errors["always_fails"].contains("also_fails"));
    }

    #[test]
    fn test_invalid_config_rejected_before_engine() {
        let yaml = r#"
monitor:
  failure_threshold: 0
"#;
        let error = assert_err!(EngineConfig::from_yaml_str(yaml));
        assert!(error.to_string().contains("Failure threshold"));

        let mut config = EngineConfig::default();
        config.healer.global_history_limit = 0;
        assert!(HealthEngine::from_config(config).is_err());
    }
}
