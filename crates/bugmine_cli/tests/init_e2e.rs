//! End-to-end tests for the `bugmine init` command.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bugmine() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bugmine"))
}

#[test]
fn creates_config_file_with_defaults() {
    let dir = TempDir::new().unwrap();

    bugmine().arg("init").current_dir(dir.path()).assert().success();

    let content = fs::read_to_string(dir.path().join(".bugmine.toml")).unwrap();
    assert!(content.contains("output_dir = \"bug-mining\""));
    assert!(content.contains("http_timeout_secs = 20"));
}

#[test]
fn existing_config_is_kept_without_force() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".bugmine.toml"), "debug = true\n").unwrap();

    bugmine()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));

    let content = fs::read_to_string(dir.path().join(".bugmine.toml")).unwrap();
    assert_eq!(content, "debug = true\n");
}

#[test]
fn force_overwrites_existing_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".bugmine.toml"), "debug = true\n").unwrap();

    bugmine().args(["init", "--force"]).current_dir(dir.path()).assert().success();

    let content = fs::read_to_string(dir.path().join(".bugmine.toml")).unwrap();
    assert!(content.contains("debug = false"));
}

#[test]
fn custom_config_path_is_honoured() {
    let dir = TempDir::new().unwrap();

    bugmine()
        .args(["init", "--config", "conf/bugmine.toml"])
        .current_dir(dir.path())
        .assert()
        .failure();

    fs::create_dir(dir.path().join("conf")).unwrap();
    bugmine()
        .args(["init", "--config", "conf/bugmine.toml"])
        .current_dir(dir.path())
        .assert()
        .success();
    assert!(dir.path().join("conf/bugmine.toml").exists());
}

#[test]
fn malformed_config_exits_with_code_two() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".bugmine.toml"), "workers = \"many\"\n").unwrap();

    bugmine()
        .arg("summarize")
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains(".bugmine.toml"));
}
