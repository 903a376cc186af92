mod support;

use std::sync::Arc;
use std::time::Duration;
use support::{orchestrator_with, orchestrator_with_store, FakeRuntime};
use tempfile::TempDir;
use tool_orchestrator::events::Subscription;
use tool_orchestrator::healthcheck::HealthState;
use tool_orchestrator::state::CoarseStatus;
use tool_orchestrator::{Error, EventBroadcaster, LifecycleEvent, NewService, Orchestrator, Store};

async fn next_event(sub: &mut Subscription) -> LifecycleEvent {
    tokio::time::timeout(Duration::from_secs(2), sub.recv())
        .await
        .expect("event not delivered in time")
        .expect("subscription closed")
}

#[tokio::test]
async fn test_status_without_record_or_container_is_stopped() {
    let orch = orchestrator_with(FakeRuntime::new()).await;

    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Stopped);
    assert!(status.container_id.is_none());
    assert!(status.recorded_status.is_none());
    assert!(status.started_at.is_none());
}

#[tokio::test]
async fn test_start_then_status_is_running_with_container_id() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;

    let handle = orch.start_container("grist").await.unwrap();
    let status = orch.resolved_status("grist").await.unwrap();

    assert_eq!(status.status, CoarseStatus::Running);
    assert_eq!(status.container_id.as_deref(), Some(handle.id.as_str()));
    assert_eq!(status.recorded_status, Some(CoarseStatus::Running));
    assert!(status.started_at.is_some());
    assert!(status.phase.is_none(), "no operation should be in flight");

    let container = runtime.container("grist").unwrap();
    assert_eq!(container.spec.container_name(), "orch_grist");
}

#[tokio::test]
async fn test_start_uses_catalog_definition() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    let def = orch.get_service("grist").await.unwrap();

    orch.start_container("grist").await.unwrap();

    let spec = runtime.container("grist").unwrap().spec;
    assert_eq!(spec.image, def.image_ref());
    assert_eq!(spec.ports, def.port_mappings());
    assert_eq!(spec.env, def.env);
}

#[tokio::test]
async fn test_start_unknown_service() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;

    let err = orch.start_container("does-not-exist").await.unwrap_err();
    assert!(matches!(err, Error::ServiceNotFound(ref id) if id == "does-not-exist"));
    assert_eq!(runtime.start_calls(), 0);
}

#[tokio::test]
async fn test_stop_never_started_is_container_not_found() {
    let orch = orchestrator_with(FakeRuntime::new()).await;

    let err = orch.stop_container("grist").await.unwrap_err();
    assert!(matches!(err, Error::ContainerNotFound(ref id) if id == "grist"));
    assert!(orch.store().get_record("grist").await.unwrap().is_none());
}

#[tokio::test]
async fn test_stop_records_stopped_and_keeps_container_id() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    let handle = orch.start_container("minio").await.unwrap();

    orch.stop_container("minio").await.unwrap();

    let record = orch.store().get_record("minio").await.unwrap().unwrap();
    assert_eq!(record.status, CoarseStatus::Stopped);
    assert_eq!(record.container_id.as_deref(), Some(handle.id.as_str()));
    assert!(record.stopped_at.is_some());

    let status = orch.resolved_status("minio").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Stopped);
    assert_eq!(status.runtime_state.as_deref(), Some("exited"));
}

#[tokio::test]
async fn test_restart_never_started_fails_with_stop_error() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;

    let err = orch.restart_container("grist").await.unwrap_err();
    assert!(matches!(err, Error::ContainerNotFound(_)));
    assert_eq!(runtime.start_calls(), 0, "start must not run after a failed stop");
}

#[tokio::test]
async fn test_restart_replaces_container() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    let first = orch.start_container("grist").await.unwrap();

    let second = orch.restart_container("grist").await.unwrap();

    assert_ne!(first.id, second.id);
    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Running);
    assert_eq!(status.container_id.as_deref(), Some(second.id.as_str()));
}

#[tokio::test]
async fn test_double_start_conflicts() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    orch.start_container("grist").await.unwrap();

    let err = orch.start_container("grist").await.unwrap_err();
    assert!(matches!(err, Error::RuntimeApi(_)));
}

#[tokio::test]
async fn test_concurrent_double_start_is_serialized() {
    let runtime = FakeRuntime::new();
    runtime.set_start_delay(Duration::from_millis(50));
    let orch = Arc::new(orchestrator_with(runtime.clone()).await);

    let a = orch.clone();
    let b = orch.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.start_container("grist").await }),
        tokio::spawn(async move { b.start_container("grist").await }),
    );
    let results = [first.unwrap(), second.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(Error::RuntimeApi(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(runtime.max_in_flight(), 1);
}

#[tokio::test]
async fn test_different_services_start_concurrently() {
    let runtime = FakeRuntime::new();
    runtime.set_start_delay(Duration::from_millis(100));
    let orch = Arc::new(orchestrator_with(runtime.clone()).await);

    let a = orch.clone();
    let b = orch.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.start_container("grist").await }),
        tokio::spawn(async move { b.start_container("minio").await }),
    );
    first.unwrap().unwrap();
    second.unwrap().unwrap();

    assert_eq!(runtime.max_in_flight(), 2);
}

#[tokio::test]
async fn test_runtime_unavailable() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    let handle = orch.start_container("grist").await.unwrap();

    runtime.set_unavailable(true);

    let err = orch.start_container("n8n").await.unwrap_err();
    assert!(err.is_unavailable());
    assert!(err.suggestion().is_some());

    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Unknown);
    assert_eq!(status.container_id.as_deref(), Some(handle.id.as_str()));
    assert_eq!(status.recorded_status, Some(CoarseStatus::Running));
    assert!(status.started_at.is_some());

    let never_started = orch.resolved_status("n8n").await.unwrap();
    assert_eq!(never_started.status, CoarseStatus::Unknown);
    assert!(never_started.container_id.is_none());
}

#[tokio::test]
async fn test_container_that_died_reads_as_stopped() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    orch.start_container("grist").await.unwrap();

    runtime.kill("grist");

    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Stopped);
    assert_eq!(status.recorded_status, Some(CoarseStatus::Running));
}

#[tokio::test]
async fn test_container_removed_out_of_band_has_no_container_id() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    orch.start_container("grist").await.unwrap();

    runtime.remove("grist");

    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Stopped);
    assert!(status.container_id.is_none());
}

#[tokio::test]
async fn test_enable_toggles_only_the_flag() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    let before = orch.get_service("grafana").await.unwrap();
    assert!(!before.enabled);
    let mut sub = orch.subscribe();

    orch.set_service_enabled("grafana", true).await.unwrap();

    let after = orch.get_service("grafana").await.unwrap();
    assert!(after.enabled);
    assert_eq!(after.image, before.image);
    assert!(runtime.container("grafana").is_none());
    assert_eq!(runtime.start_calls(), 0);
    assert!(orch.store().get_record("grafana").await.unwrap().is_none());

    assert_eq!(
        next_event(&mut sub).await,
        LifecycleEvent::ServiceEnabledChanged {
            service_id: "grafana".to_string(),
            enabled: true,
        }
    );
}

#[tokio::test]
async fn test_enable_unknown_service_emits_nothing() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    let mut sub = orch.subscribe();

    let err = orch.set_service_enabled("nope", true).await.unwrap_err();
    assert!(matches!(err, Error::ServiceNotFound(_)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_lifecycle_events_follow_operations() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    let mut sub = orch.subscribe();

    let handle = orch.start_container("grist").await.unwrap();
    assert_eq!(
        next_event(&mut sub).await,
        LifecycleEvent::ContainerStarted {
            service_id: "grist".to_string(),
            container_id: handle.id.clone(),
        }
    );

    orch.stop_container("grist").await.unwrap();
    assert_eq!(
        next_event(&mut sub).await,
        LifecycleEvent::ContainerStopped {
            service_id: "grist".to_string(),
        }
    );
}

#[tokio::test]
async fn test_failed_start_emits_no_event_and_writes_no_record() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    let mut sub = orch.subscribe();
    runtime.set_unavailable(true);

    assert!(orch.start_container("grist").await.is_err());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sub.try_recv().is_none());
    assert!(orch.store().get_record("grist").await.unwrap().is_none());
}

#[tokio::test]
async fn test_logs_tail() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    orch.start_container("grist").await.unwrap();

    let logs = orch.logs("grist", 3).await.unwrap();
    assert_eq!(logs, "line 198\nline 199\nline 200");

    let err = orch.logs("minio", 10).await.unwrap_err();
    assert!(matches!(err, Error::ContainerNotFound(_)));
}

#[tokio::test]
async fn test_stats_running_and_absent() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    orch.start_container("grist").await.unwrap();

    let stats = orch.stats("grist").await;
    assert_eq!(stats.cpu_percent, 20.0);
    assert_eq!(stats.memory_usage_mb, 100.0);
    assert_eq!(stats.memory_percent, 9.77);

    let absent = orch.stats("minio").await;
    assert_eq!(absent.cpu_percent, 0.0);
    assert_eq!(absent.memory_usage_mb, 0.0);
    assert_eq!(absent.memory_percent, 0.0);

    runtime.set_unavailable(true);
    assert_eq!(orch.stats("grist").await.cpu_percent, 0.0);
}

#[tokio::test]
async fn test_create_service_derives_id_and_starts_disabled() {
    let orch = orchestrator_with(FakeRuntime::new()).await;

    let def = orch
        .create_service(NewService {
            name: "My Tool".to_string(),
            category: "tool".to_string(),
            image: "traefik/whoami".to_string(),
            tag: "latest".to_string(),
            description: None,
            ports: vec!["9999:80".to_string()],
            env: Default::default(),
            volumes: Vec::new(),
            health_check: Some("/".to_string()),
            icon: "Box".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(def.id, "my-tool");
    assert!(!def.enabled);
    assert_eq!(orch.get_service("my-tool").await.unwrap(), def);
}

#[tokio::test]
async fn test_create_duplicate_name_conflicts() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    let existing = orch.get_service("grist").await.unwrap();

    let err = orch
        .create_service(NewService {
            name: "Grist".to_string(),
            category: existing.category,
            image: existing.image,
            tag: existing.tag,
            description: None,
            ports: Vec::new(),
            env: Default::default(),
            volumes: Vec::new(),
            health_check: None,
            icon: existing.icon,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_delete_service_cascades_and_leaves_container() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    orch.start_container("grist").await.unwrap();

    orch.delete_service("grist").await.unwrap();

    assert!(matches!(
        orch.get_service("grist").await,
        Err(Error::ServiceNotFound(_))
    ));
    assert!(orch.store().get_record("grist").await.unwrap().is_none());
    assert!(runtime.container("grist").unwrap().running);

    let err = orch.delete_service("grist").await.unwrap_err();
    assert!(matches!(err, Error::ServiceNotFound(_)));
}

#[tokio::test]
async fn test_check_health_uses_probe() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    let with_path = orch
        .list_services()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.service.health_check.is_some())
        .expect("seed catalog has a health path");

    let report = orch.check_health(&with_path.service.id).await.unwrap();
    assert_eq!(report.state, HealthState::Healthy);

    assert!(matches!(
        orch.check_health("nope").await,
        Err(Error::ServiceNotFound(_))
    ));
}

#[tokio::test]
async fn test_shutdown_ends_subscriptions() {
    let orch = orchestrator_with(FakeRuntime::new()).await;
    let mut sub = orch.subscribe();
    let token = orch.shutdown_token();

    orch.shutdown().await.unwrap();

    assert!(token.is_cancelled());
    assert!(sub.recv().await.is_none());
    assert_eq!(orch.events().subscriber_count(), 0);
    // A second shutdown is a no-op.
    orch.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_list_services_merges_resolved_status() {
    let runtime = FakeRuntime::new();
    let orch = orchestrator_with(runtime.clone()).await;
    let handle = orch.start_container("grist").await.unwrap();

    let services = orch.list_services().await.unwrap();
    assert_eq!(services.len(), 20);

    let grist = services.iter().find(|s| s.service.id == "grist").unwrap();
    assert_eq!(grist.container.status, CoarseStatus::Running);
    assert_eq!(grist.container.container_id.as_deref(), Some(handle.id.as_str()));

    let minio = services.iter().find(|s| s.service.id == "minio").unwrap();
    assert_eq!(minio.container.status, CoarseStatus::Stopped);
    assert!(minio.container.container_id.is_none());

    let ids: Vec<&str> = services.iter().map(|s| s.service.id.as_str()).collect();
    assert_eq!(ids[0], "duckdb", "catalog order is preserved");
}

/// On-disk orchestrator plus a second connection used to make record writes fail.
async fn orchestrator_on_disk(runtime: Arc<FakeRuntime>) -> (TempDir, Orchestrator) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::open(dir.path().join("orchestrator.db")).await.unwrap();
    let orch = orchestrator_with_store(
        runtime,
        store,
        EventBroadcaster::new(Duration::from_millis(200)),
    )
    .await;
    (dir, orch)
}

fn reject_record_writes(dir: &TempDir) {
    let conn = rusqlite::Connection::open(dir.path().join("orchestrator.db")).unwrap();
    conn.busy_timeout(Duration::from_secs(5)).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_record_insert BEFORE INSERT ON containers
         BEGIN SELECT RAISE(ABORT, 'record writes disabled'); END;
         CREATE TRIGGER reject_record_update BEFORE UPDATE ON containers
         BEGIN SELECT RAISE(ABORT, 'record writes disabled'); END;",
    )
    .unwrap();
}

#[tokio::test]
async fn test_failed_start_record_does_not_leave_phase_starting() {
    let runtime = FakeRuntime::new();
    let (dir, orch) = orchestrator_on_disk(runtime.clone()).await;
    reject_record_writes(&dir);

    let err = orch.start_container("grist").await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    assert!(runtime.container("grist").unwrap().running);

    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Running);
    assert!(status.phase.is_none(), "phase left at {:?}", status.phase);
    assert!(status.recorded_status.is_none());
}

#[tokio::test]
async fn test_failed_stop_record_does_not_leave_phase_stopping() {
    let runtime = FakeRuntime::new();
    let (dir, orch) = orchestrator_on_disk(runtime.clone()).await;
    orch.start_container("grist").await.unwrap();
    reject_record_writes(&dir);

    let err = orch.stop_container("grist").await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    let status = orch.resolved_status("grist").await.unwrap();
    assert_eq!(status.status, CoarseStatus::Stopped);
    assert!(status.phase.is_none(), "phase left at {:?}", status.phase);
    assert_eq!(status.recorded_status, Some(CoarseStatus::Running));
    assert!(!runtime.container("grist").unwrap().running);
}
