use tutorhub_config::types::LEGACY_LECTURE_NAMESPACE;
use tutorhub_config::*;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("absent.toml"))
        .with_env_prefix("TUTORHUB_TEST_MISSING");

    let config = manager.load().unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[api]
base_url = "https://backend.example.com"

[lecture]
route_namespace = "/api/zoom/course/lesson"
heartbeat_interval_secs = 5

[session]
expired_policy = "keep_for_refresh"
"#,
    )
    .unwrap();

    let config = ConfigManager::with_path(path)
        .with_env_prefix("TUTORHUB_TEST_FILE")
        .load()
        .unwrap();

    assert_eq!(config.api.base_url, "https://backend.example.com");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.lecture.route_namespace, LEGACY_LECTURE_NAMESPACE);
    assert_eq!(config.lecture.heartbeat_interval_secs, 5);
    assert_eq!(config.lecture.status_poll_interval_secs, 30);
    assert_eq!(config.session.expired_policy, ExpiredSessionPolicy::KeepForRefresh);
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[api]\nbase_url = \"https://file.example.com\"\n").unwrap();

    std::env::set_var("TUTORHUB_TEST_ENV_API__BASE_URL", "https://env.example.com");
    let config = ConfigManager::with_path(path)
        .with_env_prefix("TUTORHUB_TEST_ENV")
        .load()
        .unwrap();
    std::env::remove_var("TUTORHUB_TEST_ENV_API__BASE_URL");

    assert_eq!(config.api.base_url, "https://env.example.com");
}

#[test]
fn test_validation_rejects_bad_values() {
    let manager = ConfigManager::new();

    let mut config = AppConfig::default();
    assert!(manager.validate(&config).is_ok());

    config.api.base_url = "ftp://nope".to_string();
    assert!(matches!(manager.validate(&config), Err(ConfigError::Validation(_))));

    let mut config = AppConfig::default();
    config.lecture.heartbeat_interval_secs = 0;
    assert!(manager.validate(&config).is_err());

    let mut config = AppConfig::default();
    config.lecture.route_namespace = " ".to_string();
    assert!(manager.validate(&config).is_err());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let manager = ConfigManager::with_path(path.clone()).with_env_prefix("TUTORHUB_TEST_SAVE");

    let mut config = AppConfig::default();
    config.api.base_url = "https://saved.example.com".to_string();
    manager.save(&config).unwrap();

    assert!(path.exists());
    assert_eq!(manager.load().unwrap().api.base_url, "https://saved.example.com");
}
