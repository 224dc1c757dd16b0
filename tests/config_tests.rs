//! Configuration loading integration tests

use std::fs;

use tempfile::TempDir;

use taskpool::config::AppConfig;
use taskpool::error::Error;

#[test]
fn load_from_explicit_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("taskpool.toml");
    fs::write(
        &path,
        r#"
[runner]
workers = 2
queue_depth = 32

[logging]
level = "warn"
"#,
    )
    .unwrap();

    let config = AppConfig::load(path.to_str()).unwrap();
    assert_eq!(config.runner.workers, 2);
    assert_eq!(config.runner.queue_depth, 32);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let result = AppConfig::load(Some("/nonexistent/taskpool.toml"));
    assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("taskpool.toml");
    fs::write(&path, "[runner\nworkers = 2").unwrap();

    let result = AppConfig::load(path.to_str());
    assert!(matches!(result, Err(Error::ConfigParse { .. })));
}

#[test]
fn invalid_values_fail_validation() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("taskpool.toml");
    fs::write(
        &path,
        r#"
[runner]
queue_depth = 0
"#,
    )
    .unwrap();

    let result = AppConfig::load(path.to_str());
    assert!(matches!(result, Err(Error::ConfigValidation { .. })));
}

#[test]
fn init_then_load_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("generated.toml");

    taskpool::config::init_config(path.to_str(), false).unwrap();
    assert!(path.exists());

    let config = AppConfig::load(path.to_str()).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("generated.toml");

    taskpool::config::init_config(path.to_str(), false).unwrap();
    let second = taskpool::config::init_config(path.to_str(), false);
    assert!(second.is_err());

    // Force overwrites
    taskpool::config::init_config(path.to_str(), true).unwrap();
}
