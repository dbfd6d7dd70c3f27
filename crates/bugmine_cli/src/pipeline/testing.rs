//! Fake collaborators shared by the pipeline and runner tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bugmine_core::prelude::*;
use bugmine_trackers::{IssueRecord, TrackerError, TrackerQuery};
use tempfile::TempDir;

use super::{IssueSource, ReportSource, Vcs};
use crate::git::GitError;

/// Hash of the bug-fixing commit in [`LOG`].
pub const FIX: &str = "f1f1f1";
/// Hash of the only parent of [`FIX`].
pub const PARENT: &str = "a0a0a0";
/// Two-commit log whose second commit fixes `ABC-1`.
pub const LOG: &str = "commit a0a0a0\nAuthor: A <a@x>\n\n    Initial import\n\n\
                   commit f1f1f1\nAuthor: A <a@x>\n\n    Fix ABC-1: null check\n";

/// Records every call; clones create the directory, logs return `LOG`.
#[derive(Debug, Default)]
pub struct FakeVcs {
    /// Number of calls made so far.
    pub calls: Cell<usize>,
    /// Makes every clone fail.
    pub fail_clone: bool,
    /// Makes every diff fail.
    pub fail_diff: bool,
    /// Makes every diff come back empty.
    pub empty_diff: bool,
    /// Pathspec of every log and diff call, in order.
    pub pathspecs: RefCell<Vec<Option<String>>>,
    /// Parents by commit hash.
    pub parents: HashMap<String, Vec<String>>,
}

impl FakeVcs {
    /// A backend where [`FIX`] has the single parent [`PARENT`].
    pub fn new() -> Self {
        Self {
            parents: HashMap::from([(FIX.to_string(), vec![PARENT.to_string()])]),
            ..Self::default()
        }
    }

    fn failure(command: &str) -> GitError {
        GitError::CommandFailed {
            command: command.to_string(),
            status: "exit status: 128".to_string(),
            stderr: "fatal".to_string(),
        }
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn record(&self, pathspec: Option<&str>) {
        self.pathspecs.borrow_mut().push(pathspec.map(String::from));
    }
}

impl Vcs for FakeVcs {
    fn clone_bare(&self, _url: &str, dest: &Path) -> Result<(), GitError> {
        self.tick();
        if self.fail_clone {
            return Err(Self::failure("git clone"));
        }
        fs::create_dir_all(dest).unwrap();
        Ok(())
    }

    fn log(&self, _repo: &Path, pathspec: Option<&str>) -> Result<Vec<u8>, GitError> {
        self.tick();
        self.record(pathspec);
        Ok(LOG.as_bytes().to_vec())
    }

    fn parents(&self, _repo: &Path, commit: &str) -> Result<Vec<String>, GitError> {
        self.tick();
        Ok(self.parents.get(commit).cloned().unwrap_or_default())
    }

    fn diff(&self, _repo: &Path, buggy: &str, fixed: &str, pathspec: Option<&str>) -> Result<Vec<u8>, GitError> {
        self.tick();
        self.record(pathspec);
        if self.fail_diff {
            return Err(Self::failure("git diff"));
        }
        if self.empty_diff {
            return Ok(Vec::new());
        }
        Ok(format!("diff {buggy}..{fixed}\n").into_bytes())
    }
}

/// Serves a fixed issue list and records report requests.
#[derive(Debug, Default)]
pub struct FakeTrackers {
    /// Issues returned by every fetch.
    pub issues: Vec<IssueRecord>,
    /// Number of issue list fetches.
    pub issue_calls: Cell<usize>,
    /// Requested report URLs.
    pub reports: RefCell<Vec<String>>,
    /// Makes every report download fail.
    pub fail_reports: bool,
}

impl FakeTrackers {
    /// A tracker knowing exactly one issue.
    pub fn with_issue(id: &str, url: &str) -> Self {
        Self {
            issues: vec![IssueRecord::new(id, url)],
            ..Self::default()
        }
    }
}

impl IssueSource for FakeTrackers {
    fn fetch_issues(&self, _query: &TrackerQuery, _pages_dir: &Path) -> Result<Vec<IssueRecord>, TrackerError> {
        self.issue_calls.set(self.issue_calls.get() + 1);
        Ok(self.issues.clone())
    }
}

impl ReportSource for FakeTrackers {
    fn fetch_report(&self, issue_url: &str) -> Result<String, TrackerError> {
        self.reports.borrow_mut().push(issue_url.to_string());
        if self.fail_reports {
            return Err(TrackerError::Status {
                url: issue_url.to_string(),
                status: 500,
            });
        }
        Ok("<item/>".to_string())
    }
}

/// Settings rooted in `dir`.
pub fn settings(dir: &TempDir) -> Settings {
    Settings {
        output_dir: dir.path().join("out"),
        cache_dir: dir.path().join("cache"),
        ..Settings::default()
    }
}

/// Project `p1` tracked as JIRA `ABC` with the given bug-fix pattern.
pub fn project(pattern: &str) -> ProjectDescriptor {
    ProjectDescriptor::parse_line(&format!("p1\tdemo\thttps://github.com/o/r\tjira\tABC\t{pattern}")).unwrap()
}

/// Like [`project`], limited to `sub_path`.
pub fn sub_project(pattern: &str, sub_path: &str) -> ProjectDescriptor {
    ProjectDescriptor::parse_line(&format!(
        "p1\tdemo\thttps://github.com/o/r\tjira\tABC\t{pattern}\t{sub_path}"
    ))
    .unwrap()
}

