//! Configuration file round-trips and validation.

use feedweave::config::FeedConfig;
use feedweave::{FeedError, FeedRequest};

#[test]
fn saved_config_loads_back_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");

    let mut config = FeedConfig::default();
    config.orchestrator.default_limit = 12;
    config.orchestrator.default_budget_seconds = 4.5;
    config.pool.max_handles = Some(8);
    config.ranking.weights.w_distance = 0.5;
    config.host.catalog_path = Some(dir.path().join("catalog.json"));
    config.save_to_file(&path).expect("save");

    let loaded = FeedConfig::from_file(&path).expect("load");
    assert_eq!(loaded.orchestrator.default_limit, 12);
    assert_eq!(loaded.pool.max_handles, Some(8));
    assert!((loaded.ranking.weights.w_distance - 0.5).abs() < f64::EPSILON);
    assert_eq!(loaded.host.catalog_path, config.host.catalog_path);

    let request = FeedRequest::from_config(&loaded.orchestrator);
    assert_eq!(request.limit, 12);
    assert!((request.budget_seconds - 4.5).abs() < f64::EPSILON);
}

#[test]
fn partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[ranking]\nnearest_k = 3\nw_bonus = 0.4\n").expect("write");

    let config = FeedConfig::from_file(&path).expect("load");
    assert_eq!(config.ranking.nearest_k, 3);
    assert!((config.ranking.weights.w_bonus - 0.4).abs() < f64::EPSILON);
    assert!((config.ranking.weights.w_value - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.orchestrator.default_limit, 20);
    assert!(config.validate().is_ok());
}

#[test]
fn invalid_values_fail_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[orchestrator]\ndefault_budget_seconds = -2.0\n").expect("write");

    let config = FeedConfig::from_file(&path).expect("load");
    assert!(matches!(config.validate(), Err(FeedError::Config(_))));
}

#[test]
fn unparsable_file_is_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pool\nmax_handles = ").expect("write");

    assert!(matches!(FeedConfig::from_file(&path), Err(FeedError::Config(_))));
}
