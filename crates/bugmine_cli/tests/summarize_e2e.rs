//! End-to-end tests for the `bugmine summarize` command.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "bug.id,project.id,revision.id.buggy,revision.id.fixed,report.id,report.url,\
                      buggy_commit_url,fixed_commit_url,compare_url";

fn bugmine() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bugmine"))
}

fn write_registry(root: &Path, project: &str, rows: &[&str]) {
    let dir = root.join(project);
    fs::create_dir_all(&dir).unwrap();
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(dir.join("active-bugs.csv"), content).unwrap();
}

#[test]
fn counts_bugs_per_project() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("bug-mining");
    write_registry(
        &output,
        "Lang",
        &[
            "1,Lang,a,b,LANG-12,NA,NA,NA,NA",
            "2,Lang,c,d,LANG-40,NA,NA,NA,NA",
        ],
    );
    write_registry(&output, "Bsf", &["1,Bsf,e,f,BSF-3,NA,NA,NA,NA"]);
    write_registry(&output, "Empty", &[]);

    bugmine()
        .arg("summarize")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 bugs across 2 projects"));

    let summary = fs::read_to_string(dir.path().join("bug_summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "project_id,bug_count,issue_ids");
    assert!(lines[1].starts_with("Bsf,1,"));
    assert!(lines[2].starts_with("Lang,2,"));
    assert!(lines[2].contains("12"));
    assert!(lines[2].contains("40"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn explicit_directory_and_output_path() {
    let dir = TempDir::new().unwrap();
    write_registry(&dir.path().join("mined"), "Io", &["1,Io,a,b,IO-5,NA,NA,NA,NA"]);

    bugmine()
        .args(["summarize", "mined", "-o", "io-summary.csv"])
        .current_dir(dir.path())
        .assert()
        .success();

    let summary = fs::read_to_string(dir.path().join("io-summary.csv")).unwrap();
    assert!(summary.contains("Io,1,"));
}

#[test]
fn no_mined_bugs_writes_no_summary() {
    let dir = TempDir::new().unwrap();
    write_registry(&dir.path().join("bug-mining"), "Empty", &[]);

    bugmine()
        .arg("summarize")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("no mined bugs found"));

    assert!(!dir.path().join("bug_summary.csv").exists());
}

#[test]
fn missing_output_directory_fails() {
    let dir = TempDir::new().unwrap();

    bugmine()
        .arg("summarize")
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bug-mining"));
}
