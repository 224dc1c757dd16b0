//! CLI integration tests
//!
//! Exercises the built binary end to end with assert_cmd.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn taskpool_cmd() -> Command {
    Command::cargo_bin("taskpool").unwrap()
}

#[test]
fn help_describes_the_tool() {
    taskpool_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker-pool task runner"));
}

#[test]
fn version_flag_prints_version() {
    taskpool_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_init_creates_a_valid_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("taskpool.toml");

    taskpool_cmd()
        .args(["config", "init", "--path", path.to_str().unwrap()])
        .assert()
        .success();
    assert!(path.exists());

    taskpool_cmd()
        .args(["config", "validate", "--config", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn config_show_prints_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("taskpool.toml");
    fs::write(
        &path,
        r#"
[runner]
workers = 2
queue_depth = 16
"#,
    )
    .unwrap();

    taskpool_cmd()
        .args(["config", "show", "--config", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("queue_depth = 16"));
}

#[test]
fn run_reports_every_outcome() {
    taskpool_cmd()
        .args(["--quiet", "run", "--tasks", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 0 result"))
        .stdout(predicate::str::contains("Task 2 result"))
        .stdout(predicate::str::contains("3 completed, 1 failed"));
}

#[test]
fn run_with_missing_config_fails_with_config_exit_code() {
    taskpool_cmd()
        .args(["run", "--config", "/nonexistent/taskpool.toml"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("E100"));
}
