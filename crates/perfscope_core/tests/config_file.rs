use perfscope_core::config::ENV_INSIGHTS_BASE_URL;
use perfscope_core::{open_db, ConfigError, CoreConfig, SqliteStore};
use std::io::Write;

#[test]
fn load_reads_toml_file_and_env_override_wins() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("perfscope.db");
    let config_path = dir.path().join("perfscope.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        "database_path = {:?}\n\n[insights]\nbase_url = \"http://10.0.0.5:8000\"\ntimeout_ms = 1500",
        db_path.display().to_string()
    )
    .unwrap();
    drop(file);

    let config = CoreConfig::load(&config_path).unwrap();
    assert_eq!(config.database_path, db_path);
    assert_eq!(config.insights.timeout_ms, 1_500);

    let config = config
        .apply_env_overrides(|key| {
            (key == ENV_INSIGHTS_BASE_URL).then(|| "https://insights.example.org".to_string())
        })
        .unwrap();
    assert_eq!(config.insights.base_url, "https://insights.example.org");

    let conn = open_db(&config.database_path).unwrap();
    assert!(SqliteStore::try_new(&conn).is_ok());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CoreConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
