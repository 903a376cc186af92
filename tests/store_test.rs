use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;
use tool_orchestrator::catalog::default_catalog;
use tool_orchestrator::state::{CoarseStatus, NewLayout};
use tool_orchestrator::Store;

fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

async fn open_seeded(dir: &TempDir) -> Store {
    let store = Store::open(dir.path().join("orchestrator.db")).await.unwrap();
    store.initialize().await.unwrap();
    store.seed_if_empty(default_catalog()).await.unwrap();
    store
}

#[tokio::test]
async fn test_open_creates_parent_directories() {
    let temp_dir = create_test_dir();
    let path = temp_dir.path().join("nested").join("state").join("orch.db");

    let store = Store::open(&path).await.unwrap();
    store.initialize().await.unwrap();

    assert!(path.exists());
    assert_eq!(store.path(), path.as_path());
}

#[tokio::test]
async fn test_seed_only_when_empty() {
    let temp_dir = create_test_dir();
    let store = Store::open(temp_dir.path().join("orch.db")).await.unwrap();
    store.initialize().await.unwrap();

    let first = store.seed_if_empty(default_catalog()).await.unwrap();
    let second = store.seed_if_empty(default_catalog()).await.unwrap();

    assert_eq!(first, 20);
    assert_eq!(second, 0);
    assert_eq!(store.count_services().await.unwrap(), 20);
}

#[tokio::test]
async fn test_seeded_catalog_keeps_declaration_order() {
    let temp_dir = create_test_dir();
    let store = open_seeded(&temp_dir).await;

    let ids: Vec<String> = store
        .list_services()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    let expected: Vec<String> = default_catalog().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp_dir = create_test_dir();
    {
        let store = open_seeded(&temp_dir).await;
        store.set_service_enabled("redis", true).await.unwrap();
        store
            .record_started("grist", "abc123", Utc::now())
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let store = Store::open(temp_dir.path().join("orchestrator.db"))
        .await
        .unwrap();
    store.initialize().await.unwrap();

    assert!(store.get_service("redis").await.unwrap().unwrap().enabled);
    let record = store.get_record("grist").await.unwrap().unwrap();
    assert_eq!(record.status, CoarseStatus::Running);
    assert_eq!(record.container_id.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_definition_fields_round_trip() {
    let temp_dir = create_test_dir();
    let store = open_seeded(&temp_dir).await;

    let expected = default_catalog()
        .into_iter()
        .find(|s| s.id == "minio")
        .unwrap();
    let stored = store.get_service("minio").await.unwrap().unwrap();

    assert_eq!(stored, expected);
    assert_eq!(stored.env.get("MINIO_ROOT_USER").map(String::as_str), Some("admin"));
}

#[tokio::test]
async fn test_delete_cascades_to_lifecycle_record() {
    let temp_dir = create_test_dir();
    let store = open_seeded(&temp_dir).await;
    store
        .record_started("grist", "abc123", Utc::now())
        .await
        .unwrap();
    assert!(store.get_record("grist").await.unwrap().is_some());

    assert!(store.delete_service("grist").await.unwrap());

    assert!(store.get_record("grist").await.unwrap().is_none());
    assert!(!store.delete_service("grist").await.unwrap());
}

#[tokio::test]
async fn test_records_require_catalog_entry() {
    let temp_dir = create_test_dir();
    let store = open_seeded(&temp_dir).await;

    assert!(!store
        .record_started("ghost", "abc", Utc::now())
        .await
        .unwrap());
    assert!(!store.record_stopped("ghost", Utc::now()).await.unwrap());
    assert!(store.get_record("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_layouts_round_trip() {
    let temp_dir = create_test_dir();
    let store = open_seeded(&temp_dir).await;
    let data = json!([
        {"i": "grafana", "x": 0, "y": 0, "w": 6, "h": 4},
        {"i": "prometheus", "x": 6, "y": 0, "w": 6, "h": 4}
    ]);

    let created = store
        .create_layout(NewLayout {
            name: "Monitoring".to_string(),
            layout_data: data.clone(),
            is_default: true,
        })
        .await
        .unwrap();
    store.close().await.unwrap();

    let store = Store::open(temp_dir.path().join("orchestrator.db"))
        .await
        .unwrap();
    store.initialize().await.unwrap();
    let layouts = store.list_layouts().await.unwrap();

    assert_eq!(layouts.len(), 1);
    assert_eq!(layouts[0].id, created.id);
    assert_eq!(layouts[0].name, "Monitoring");
    assert_eq!(layouts[0].layout_data, data);
    assert!(layouts[0].is_default);
}

#[tokio::test]
async fn test_layout_requires_name() {
    let temp_dir = create_test_dir();
    let store = open_seeded(&temp_dir).await;

    let result = store
        .create_layout(NewLayout {
            name: "  ".to_string(),
            layout_data: json!([]),
            is_default: false,
        })
        .await;

    assert!(matches!(result, Err(tool_orchestrator::Error::Validation(_))));
}
