//! End-to-end tests for the `bugmine xref` command.

#![expect(clippy::expect_used, reason = "tests use expect for clearer failure messages")]

use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bugmine() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bugmine"))
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8(output.stdout).expect("utf-8 output")
}

fn commit(dir: &Path, file: &str, content: &str, msg: &str) {
    fs::write(dir.join(file), content).expect("write failed");
    git(dir, &["add", file]);
    git(dir, &["commit", "-m", msg]);
}

/// A repository with a root commit, a fix for `LANG-7`, and a commit
/// mentioning an issue the tracker does not know. The log and issue list
/// sit next to it.
fn setup() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let repo = dir.path().join("repo");
    fs::create_dir(&repo).expect("mkdir repo");

    git(&repo, &["init"]);
    git(&repo, &["config", "user.email", "test@test.com"]);
    git(&repo, &["config", "user.name", "Test User"]);
    commit(&repo, "a.txt", "one\n", "LANG-7 initial import");
    commit(&repo, "a.txt", "two\n", "Fixed LANG-7 overflow");
    commit(&repo, "a.txt", "three\n", "Fixed LANG-99 typo");

    let log = git(&repo, &["log", "--reverse", "--no-decorate", "--no-color"]);
    fs::write(dir.path().join("gitlog.txt"), log).expect("write log");
    fs::write(
        dir.path().join("issues.txt"),
        "LANG-7,https://issues.apache.org/jira/browse/LANG-7\n",
    )
    .expect("write issues");
    dir
}

fn xref(dir: &TempDir, pattern: &str) -> Command {
    let mut cmd = bugmine();
    cmd.args([
        "xref",
        "-e",
        pattern,
        "-l",
        "gitlog.txt",
        "-r",
        "repo/.git",
        "-i",
        "issues.txt",
        "-f",
        "out/active-bugs.csv",
        "--repo-url",
        "https://github.com/apache/commons-lang.git",
        "--project-id",
        "Lang",
    ])
    .current_dir(dir.path());
    cmd
}

#[test]
fn writes_header_and_one_row_per_fix() {
    let dir = setup();

    xref(&dir, "(LANG-\\d+)")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 bug appended"));

    let csv = fs::read_to_string(dir.path().join("out/active-bugs.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2, "root commit and unknown issue are skipped");
    assert!(lines[0].starts_with("bug.id,"));
    assert!(lines[1].starts_with("1,Lang,"));
    assert!(lines[1].contains(",LANG-7,https://issues.apache.org/jira/browse/LANG-7,"));
    assert!(lines[1].contains("https://github.com/apache/commons-lang/compare/"));
}

#[test]
fn second_pass_appends_with_continued_numbering() {
    let dir = setup();

    xref(&dir, "(LANG-\\d+)").assert().success();
    xref(&dir, "(LANG-\\d+)").assert().success();

    let csv = fs::read_to_string(dir.path().join("out/active-bugs.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines.iter().filter(|l| l.starts_with("bug.id,")).count(), 1);
    assert!(lines[2].starts_with("2,Lang,"));
}

#[test]
fn pattern_without_capture_group_fails() {
    let dir = setup();

    xref(&dir, "LANG-\\d+").assert().code(2);
    assert!(!dir.path().join("out/active-bugs.csv").exists());
}

#[test]
fn empty_issue_list_fails() {
    let dir = setup();
    fs::write(dir.path().join("issues.txt"), "\n").unwrap();

    xref(&dir, "(LANG-\\d+)")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("contains no issues"));
}

#[test]
fn no_match_still_creates_the_registry() {
    let dir = setup();

    xref(&dir, "(MATH-\\d+)")
        .assert()
        .success()
        .stderr(predicate::str::contains("no commit matched"));

    let csv = fs::read_to_string(dir.path().join("out/active-bugs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1);
}
