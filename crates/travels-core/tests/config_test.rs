//! Config loading: TOML defaults, overrides, and validation.

use travels_core::config::{CacheMode, TravelsConfig};
use travels_core::errors::ConfigError;
use travels_core::types::TargetDatabase;
use travels_core::TravelsErrorCode;

#[test]
fn empty_toml_yields_defaults() {
    let config = TravelsConfig::from_toml("").unwrap();
    assert_eq!(config.analysis.hot_join_limit, 20);
    assert_eq!(config.analysis.source_db_type, "postgres");
    assert_eq!(config.cache.mode, CacheMode::Relaxed);
    assert_eq!(config.cache.default_target, TargetDatabase::MongoDb);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.analysis.thresholds.unbounded_children, 1000);
    assert!((config.analysis.thresholds.embed_min_co_access - 0.7).abs() < 1e-12);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = TravelsConfig::from_toml(
        r#"
[analysis.thresholds]
embed_max_children = 50

[cache]
mode = "strict"
default_target = "dynamodb"
"#,
    )
    .unwrap();
    assert_eq!(config.analysis.thresholds.embed_max_children, 50);
    assert!((config.analysis.thresholds.embed_max_child_write_ratio - 0.3).abs() < 1e-12);
    assert_eq!(config.cache.mode, CacheMode::Strict);
    assert_eq!(config.cache.default_target, TargetDatabase::DynamoDb);
    assert_eq!(config.cache.model, "rule-engine");
}

#[test]
fn out_of_range_ratio_is_rejected() {
    let err = TravelsConfig::from_toml(
        r#"
[analysis.thresholds]
candidate_min_co_access = 1.5
"#,
    )
    .unwrap_err();
    match &err {
        ConfigError::Invalid { field, .. } => {
            assert_eq!(field, "analysis.thresholds.candidate_min_co_access")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.error_code(), "CONFIG_INVALID");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = TravelsConfig::from_toml("[analysis\nhot_join_limit = ").unwrap_err();
    assert_eq!(err.error_code(), "CONFIG_PARSE");
}

#[test]
fn overrides_replace_file_values() {
    let mut config = TravelsConfig::default();
    config
        .apply_overrides(|key| match key {
            "TRAVELS_CACHE_DIR" => Some("/tmp/travels-cache".to_string()),
            "TRAVELS_CACHE_MODE" => Some("STRICT".to_string()),
            "TRAVELS_MODEL" => Some("advisor-v2".to_string()),
            "TRAVELS_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.cache.dir, std::path::PathBuf::from("/tmp/travels-cache"));
    assert_eq!(config.cache.mode, CacheMode::Strict);
    assert_eq!(config.cache.model, "advisor-v2");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn bad_override_is_reported() {
    let mut config = TravelsConfig::default();
    let err = config
        .apply_overrides(|key| (key == "TRAVELS_CACHE_MODE").then(|| "fuzzy".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("cache.mode"));
}

#[test]
fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("travels.toml");
    std::fs::write(&path, "[analysis]\nhot_join_limit = 5\n").unwrap();
    let config = TravelsConfig::load(Some(&path)).unwrap();
    assert_eq!(config.analysis.hot_join_limit, 5);

    let missing = TravelsConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(missing.analysis.hot_join_limit, 20);
}
