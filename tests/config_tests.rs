use swipedeck::catalog::{CandidateKind, CatalogSource, JsonFileCatalog, Level};
use swipedeck::decisions::StoreError;
use swipedeck::config::{EngineConfig, KeywordMode};
use swipedeck::error::EngineError;

#[test]
fn test_defaults_are_valid() {
    let config = EngineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.stack.window_size, 3);
    assert_eq!(config.filter.keyword_mode, KeywordMode::Any);
    assert!(config.backend.is_none());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let text = r#"
        [gesture]
        commit_threshold = 140.0

        [filter]
        keyword_mode = "all"
        vocabulary = ["piano", "guitar"]

        [backend]
        base_url = "http://localhost:8080"
    "#;

    let config = EngineConfig::from_toml_str(text).unwrap();

    assert_eq!(config.gesture.commit_threshold, 140.0);
    assert_eq!(config.gesture.hint_threshold, 45.0);
    assert_eq!(config.filter.keyword_mode, KeywordMode::All);
    assert_eq!(config.filter.vocabulary.len(), 2);
    let backend = config.backend.unwrap();
    assert_eq!(backend.timeout_ms, 5_000);
    assert!(backend.api_key.is_none());
}

#[test]
fn test_commit_must_exceed_hint() {
    let text = r#"
        [gesture]
        hint_threshold = 120.0
        commit_threshold = 100.0
    "#;

    let err = EngineConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn test_rejects_zero_window_and_blank_backend() {
    let mut config = EngineConfig::default();
    config.stack.window_size = 0;
    assert!(config.validate().is_err());

    let err = EngineConfig::from_toml_str("[backend]\nbase_url = \"  \"\n").unwrap_err();
    assert_eq!(err, EngineError::Config("backend.base_url must be set".into()));
}

#[test]
fn test_malformed_toml() {
    let err = EngineConfig::from_toml_str("[gesture\ncommit_threshold = ").unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swipedeck.toml");
    std::fs::write(&path, "[stack]\nwindow_size = 5\n").unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.stack.window_size, 5);

    let missing = EngineConfig::load(&dir.path().join("nope.toml"));
    assert!(matches!(missing, Err(EngineError::Config(_))));
}

#[tokio::test]
async fn test_json_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let json = r#"[
        {"id": "t1", "kind": "teacher", "price": 300.0, "level": "beginner",
         "searchable_text": "Violin", "tags": ["strings"], "payload": {"name": "Mia"}},
        {"id": "r1", "kind": "classroom", "price": 900.0, "level": "advanced"}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let candidates = JsonFileCatalog::new(path).fetch_candidates().await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].tags, vec!["strings".to_string()]);
    assert!(candidates[1].searchable_text.is_empty());
    assert_eq!(candidates[0].payload["name"], "Mia");
}

#[tokio::test]
async fn test_json_catalog_tolerates_bad_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let json = r#"[
        {"id": "t1", "kind": "teacher", "price": 300.0, "level": "beginner"},
        {"id": "t2", "kind": "teacher", "price": 700.0, "level": "Advanced"},
        {"id": "r1", "price": 900.0, "level": " INTERMEDIATE "},
        {"id": "t3", "kind": "teacher", "price": 100.0, "level": "expert"},
        {"id": "t4", "kind": "teacher", "level": "beginner"}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let candidates = JsonFileCatalog::new(path).fetch_candidates().await.unwrap();

    let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "r1"]);
    assert_eq!(candidates[1].level, Level::Advanced);
    assert_eq!(candidates[2].level, Level::Intermediate);
    assert_eq!(candidates[2].kind, None);
    assert_eq!(candidates[0].kind, Some(CandidateKind::Teacher));
}

#[tokio::test]
async fn test_json_catalog_must_be_an_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"{"id": "t1"}"#).unwrap();

    let result = JsonFileCatalog::new(path).fetch_candidates().await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));
}
