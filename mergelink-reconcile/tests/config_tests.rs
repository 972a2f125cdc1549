use mergelink_reconcile::{DuplicatePolicy, MergeReconciler, ReconcileConfig, ReconcileError};
use std::io::Write;

#[test]
fn default_preserves_sibling_duplicates() {
    let config = ReconcileConfig::default();
    assert_eq!(config.duplicate_policy, DuplicatePolicy::Preserve);
    assert_eq!(MergeReconciler::default().config(), &config);
}

#[test]
fn parse_from_json() {
    let config = ReconcileConfig::from_json_str(r#"{"duplicate_policy":"deduplicate"}"#).unwrap();
    assert_eq!(config.duplicate_policy, DuplicatePolicy::Deduplicate);
}

#[test]
fn missing_fields_take_defaults() {
    let config = ReconcileConfig::from_json_str("{}").unwrap();
    assert_eq!(config, ReconcileConfig::default());
}

#[test]
fn unknown_policy_is_a_config_error() {
    let err = ReconcileConfig::from_json_str(r#"{"duplicate_policy":"merge"}"#).unwrap_err();
    assert!(matches!(err, ReconcileError::Config(_)));
    assert!(format!("{err}").contains("configuration error"));
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"duplicate_policy":"preserve"}}"#).unwrap();

    let config = ReconcileConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.duplicate_policy, DuplicatePolicy::Preserve);
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReconcileConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ReconcileError::Config(ref msg) if msg.contains("absent.json")));
}

#[test]
fn config_serializes_policy_in_snake_case() {
    let config = ReconcileConfig {
        duplicate_policy: DuplicatePolicy::Deduplicate,
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"duplicate_policy":"deduplicate"}"#);
}
