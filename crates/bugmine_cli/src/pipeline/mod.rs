//! The per-project mining pipeline.
//!
//! A project moves through a fixed sequence of stages:
//!
//! ```text
//! CLONE -> FETCH_ISSUES -> COLLECT_LOG -> CROSS_REFERENCE -> MATERIALIZE
//! ```
//!
//! Every stage first checks whether its artifact already exists and skips
//! its work if so, which makes a second run over the same manifest free of
//! git and network calls. The first failing stage ends the project.

mod http;
mod layout;
mod locks;
/// Fake collaborators for tests.
#[cfg(test)]
pub mod testing;

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::PoisonError;

use anyhow::{Context as _, bail};
use bugmine_core::fs_util::{atomic_write, is_nonempty_dir, is_nonempty_file};
use bugmine_core::prelude::*;
use bugmine_trackers::{IssueRecord, TrackerError, TrackerQuery, report_format};
use tracing::{debug, error, info, warn};

pub use self::http::HttpTrackers;
pub use self::layout::ProjectLayout;
pub use self::locks::CacheLocks;
use crate::git::{Git, GitError};

/// Version-control operations the pipeline needs.
pub trait Vcs {
    /// Creates a bare clone of `url` at `dest`.
    fn clone_bare(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Returns the full log, oldest commit first, restricted to `pathspec`
    /// when one is given.
    fn log(&self, repo: &Path, pathspec: Option<&str>) -> Result<Vec<u8>, GitError>;

    /// Returns the parent hashes of `commit`.
    fn parents(&self, repo: &Path, commit: &str) -> Result<Vec<String>, GitError>;

    /// Returns the diff between two commits, restricted to `pathspec` when
    /// one is given.
    fn diff(&self, repo: &Path, buggy: &str, fixed: &str, pathspec: Option<&str>) -> Result<Vec<u8>, GitError>;
}

impl Vcs for Git {
    fn clone_bare(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        Self::clone_bare(self, url, dest)
    }

    fn log(&self, repo: &Path, pathspec: Option<&str>) -> Result<Vec<u8>, GitError> {
        Self::log(self, repo, pathspec)
    }

    fn parents(&self, repo: &Path, commit: &str) -> Result<Vec<String>, GitError> {
        Self::parents(self, repo, commit)
    }

    fn diff(&self, repo: &Path, buggy: &str, fixed: &str, pathspec: Option<&str>) -> Result<Vec<u8>, GitError> {
        Self::diff(self, repo, buggy, fixed, pathspec)
    }
}

/// Downloads a tracker project's issue list.
pub trait IssueSource {
    /// Fetches every issue matching `query`, caching raw pages in `pages_dir`.
    fn fetch_issues(&self, query: &TrackerQuery, pages_dir: &Path) -> Result<Vec<IssueRecord>, TrackerError>;
}

/// Downloads a single issue report.
pub trait ReportSource {
    /// Fetches the report behind `issue_url`.
    fn fetch_report(&self, issue_url: &str) -> Result<String, TrackerError>;
}

/// Resolves commit parents from a cloned repository.
#[derive(Debug)]
pub struct RepoParents<'a, V> {
    vcs: &'a V,
    repository: &'a Path,
}

impl<'a, V: Vcs> RepoParents<'a, V> {
    /// Resolves parents inside `repository`.
    pub const fn new(vcs: &'a V, repository: &'a Path) -> Self {
        Self { vcs, repository }
    }
}

impl<V: Vcs> ParentResolver for RepoParents<'_, V> {
    type Error = GitError;

    fn parents(&self, commit: &str) -> Result<Vec<String>, Self::Error> {
        self.vcs.parents(self.repository, commit)
    }
}

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Bare-clone the repository into the cache.
    Clone,
    /// Download the shared issue list.
    FetchIssues,
    /// Capture the commit log.
    CollectLog,
    /// Match commits against issues and write the bug registry.
    CrossReference,
    /// Write patches and reports for every registered bug.
    Materialize,
}

impl Stage {
    /// Human-readable progress description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Clone => "Cloning repository",
            Self::FetchIssues => "Fetching issues",
            Self::CollectLog => "Collecting commit log",
            Self::CrossReference => "Cross-referencing commits",
            Self::Materialize => "Materializing patches and reports",
        }
    }

    /// Short reason reported when the stage fails.
    #[must_use]
    pub const fn failure(self) -> &'static str {
        match self {
            Self::Clone => "Clone failed",
            Self::FetchIssues => "Issue download failed",
            Self::CollectLog => "Git log failed",
            Self::CrossReference => "XRef failed",
            Self::Materialize => "Invalid CSV file",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clone => "clone",
            Self::FetchIssues => "fetch-issues",
            Self::CollectLog => "collect-log",
            Self::CrossReference => "cross-reference",
            Self::Materialize => "materialize",
        })
    }
}

/// Whether a stage did work or found its artifact in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The stage ran.
    Done,
    /// The stage's artifact already existed.
    Cached,
}

/// A stage failure, which ends the project.
#[derive(Debug)]
pub struct StageError {
    stage: Stage,
    cause: anyhow::Error,
}

impl StageError {
    /// The stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Short reason for status lines.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        self.stage.failure()
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.stage.failure(), self.cause)
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Counts of what the materialize stage did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    /// Rows read from the bug registry.
    pub rows: usize,
    /// Patches written by this run.
    pub patches_written: usize,
    /// Patches already present.
    pub patches_cached: usize,
    /// Patches that came out empty.
    pub patches_empty: usize,
    /// Diffs that failed.
    pub patches_failed: usize,
    /// Reports downloaded by this run.
    pub reports_written: usize,
    /// Reports already present.
    pub reports_cached: usize,
    /// Reports that could not be downloaded.
    pub reports_failed: usize,
}

/// Receives stage results as the pipeline advances.
pub trait StageReporter {
    /// Called once per attempted stage.
    fn stage_finished(&mut self, stage: Stage, ok: bool);
}

/// Discards stage results.
impl StageReporter for () {
    fn stage_finished(&mut self, _stage: Stage, _ok: bool) {}
}

/// Runs the stage sequence for projects sharing one set of collaborators.
#[derive(Debug)]
pub struct Pipeline<'a, V, T> {
    settings: &'a Settings,
    vcs: &'a V,
    trackers: &'a T,
    locks: &'a CacheLocks,
}

impl<'a, V, T> Pipeline<'a, V, T>
where
    V: Vcs,
    T: IssueSource + ReportSource,
{
    /// Creates a pipeline over the given collaborators.
    pub const fn new(settings: &'a Settings, vcs: &'a V, trackers: &'a T, locks: &'a CacheLocks) -> Self {
        Self {
            settings,
            vcs,
            trackers,
            locks,
        }
    }

    /// Mines one project, stopping at the first failing stage.
    pub fn run(
        &self,
        project: &ProjectDescriptor,
        reporter: &mut dyn StageReporter,
    ) -> Result<MaterializeStats, StageError> {
        let layout = ProjectLayout::new(self.settings, project);

        step(Stage::Clone, reporter, || self.clone_repository(project, &layout))?;
        step(Stage::FetchIssues, reporter, || self.fetch_issues(project, &layout))?;
        step(Stage::CollectLog, reporter, || self.collect_log(project, &layout))?;
        step(Stage::CrossReference, reporter, || self.cross_reference(project, &layout))?;
        step(Stage::Materialize, reporter, || self.materialize(project, &layout))
    }

    fn clone_repository(&self, project: &ProjectDescriptor, layout: &ProjectLayout) -> anyhow::Result<StageStatus> {
        if is_nonempty_dir(&layout.repository) {
            info!(repository = %layout.repository.display(), "repository already cached");
            return Ok(StageStatus::Cached);
        }

        create_dir(&layout.project_cache)?;
        self.vcs
            .clone_bare(&project.repository_url, &layout.repository)
            .with_context(|| format!("failed to clone {}", project.repository_url))?;
        Ok(StageStatus::Done)
    }

    fn fetch_issues(&self, project: &ProjectDescriptor, layout: &ProjectLayout) -> anyhow::Result<StageStatus> {
        let lock = self.locks.lock_for(&layout.issues);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let key = project.issue_cache_key();
        if is_nonempty_file(&layout.issues) {
            info!(cache = %key, "shared issues already cached");
            return Ok(StageStatus::Cached);
        }

        create_dir(&layout.issues_dir)?;
        let query = TrackerQuery::new(project.tracker, &project.tracker_project_id);
        let records = self
            .trackers
            .fetch_issues(&query, &layout.issues_dir)
            .with_context(|| format!("failed to download issues for {key}"))?;

        if records.is_empty() {
            bail!("tracker returned no issues for {key}");
        }

        let content: String = records.iter().map(|record| format!("{record}\n")).collect();
        atomic_write(&layout.issues, &content)
            .with_context(|| format!("failed to write {}", layout.issues.display()))?;

        info!(cache = %key, issues = records.len(), "shared issues downloaded");
        Ok(StageStatus::Done)
    }

    fn collect_log(&self, project: &ProjectDescriptor, layout: &ProjectLayout) -> anyhow::Result<StageStatus> {
        if is_nonempty_file(&layout.log) {
            info!(log = %layout.log.display(), "commit log already cached");
            return Ok(StageStatus::Cached);
        }

        let log = self.vcs.log(&layout.repository, pathspec(project))?;
        if log.is_empty() {
            warn!(path = %project.sub_project_path, "commit log is empty");
        }

        create_dir(&layout.project_cache)?;
        fs::write(&layout.log, &log).with_context(|| format!("failed to write {}", layout.log.display()))?;
        Ok(StageStatus::Done)
    }

    fn cross_reference(&self, project: &ProjectDescriptor, layout: &ProjectLayout) -> anyhow::Result<StageStatus> {
        let registry = layout.bug_registry();
        if registry.exists() {
            info!(csv = %layout.bugs_csv.display(), "bug registry already exists");
            return Ok(StageStatus::Cached);
        }

        info!(pattern = %project.bug_fix_pattern, "cross-referencing commit log");
        let pattern = BugPattern::new(&project.bug_fix_pattern, self.settings.pattern_options())?;
        let issues = IssueRegistry::load(&layout.issues)?;

        create_dir(&layout.output)?;
        registry.create().context("failed to write CSV header")?;

        let result = self.write_bug_records(project, layout, &pattern, &issues, &registry);
        if result.is_err() {
            // A header-only registry would make later runs skip this stage.
            if let Err(error) = fs::remove_file(&layout.bugs_csv) {
                warn!(csv = %layout.bugs_csv.display(), %error, "could not remove partial bug registry");
            }
        }
        result
    }

    fn write_bug_records(
        &self,
        project: &ProjectDescriptor,
        layout: &ProjectLayout,
        pattern: &BugPattern,
        issues: &IssueRegistry,
        registry: &BugRegistry,
    ) -> anyhow::Result<StageStatus> {
        let commits = CommitStream::open(&layout.log)
            .with_context(|| format!("failed to open {}", layout.log.display()))?;
        let parents = RepoParents::new(self.vcs, &layout.repository);

        let report = CrossReferencer::new(pattern, issues, &parents, &project.project_id, &project.repository_url)
            .run(commits)
            .with_context(|| format!("failed to read {}", layout.log.display()))?;

        registry.append(&report.records)?;

        let tally = report.tally;
        info!(
            examined = tally.examined,
            bugs = report.records.len(),
            no_pattern_match = tally.no_pattern_match,
            unknown_issue = tally.unknown_issue,
            root = tally.root,
            merge = tally.merge,
            parent_unavailable = tally.parent_unavailable,
            "cross-reference complete"
        );
        Ok(StageStatus::Done)
    }

    fn materialize(&self, project: &ProjectDescriptor, layout: &ProjectLayout) -> anyhow::Result<MaterializeStats> {
        let rows = layout.bug_registry().read_rows()?;
        create_dir(&layout.patches)?;
        create_dir(&layout.reports)?;

        let mut stats = MaterializeStats {
            rows: rows.len(),
            ..MaterializeStats::default()
        };

        for row in &rows {
            match row.report_url() {
                Some(url) => self.materialize_report(layout, row, url, &mut stats),
                None => debug!(bug = %row.bug_id, "no report URL"),
            }

            if row.has_commits() {
                self.materialize_patch(project, layout, row, &mut stats);
            } else {
                debug!(bug = %row.bug_id, "missing commit hash, no patch");
            }
        }

        info!(
            rows = stats.rows,
            patches = stats.patches_written,
            patches_cached = stats.patches_cached,
            patches_empty = stats.patches_empty,
            patches_failed = stats.patches_failed,
            reports = stats.reports_written,
            reports_cached = stats.reports_cached,
            reports_failed = stats.reports_failed,
            "artifacts materialized"
        );
        Ok(stats)
    }

    fn materialize_report(&self, layout: &ProjectLayout, row: &BugRow, url: &str, stats: &mut MaterializeStats) {
        let path = layout.report_path(&row.bug_id, report_format(url));
        if path.exists() {
            stats.reports_cached += 1;
            return;
        }

        info!(bug = %row.bug_id, %url, "downloading report");
        let written = self
            .trackers
            .fetch_report(url)
            .map_err(anyhow::Error::from)
            .and_then(|body| atomic_write(&path, &body).map_err(anyhow::Error::from));

        match written {
            Ok(()) => stats.reports_written += 1,
            Err(error) => {
                warn!(bug = %row.bug_id, %url, error = %format!("{error:#}"), "report download failed");
                stats.reports_failed += 1;
            }
        }
    }

    fn materialize_patch(
        &self,
        project: &ProjectDescriptor,
        layout: &ProjectLayout,
        row: &BugRow,
        stats: &mut MaterializeStats,
    ) {
        let path = layout.patch_path(&row.bug_id);
        if path.exists() {
            stats.patches_cached += 1;
            return;
        }

        debug!(bug = %row.bug_id, buggy = %row.buggy_commit, fixed = %row.fixed_commit, "generating patch");
        let written = self
            .vcs
            .diff(&layout.repository, &row.buggy_commit, &row.fixed_commit, pathspec(project))
            .map_err(anyhow::Error::from)
            .and_then(|diff| {
                fs::write(&path, &diff)?;
                Ok(diff.is_empty())
            });

        match written {
            Ok(empty) => {
                if empty {
                    warn!(bug = %row.bug_id, "generated patch is empty");
                    stats.patches_empty += 1;
                }
                stats.patches_written += 1;
            }
            Err(error) => {
                warn!(bug = %row.bug_id, error = %format!("{error:#}"), "patch generation failed");
                if path.exists()
                    && let Err(error) = fs::remove_file(&path)
                {
                    warn!(patch = %path.display(), %error, "could not remove partial patch");
                }
                stats.patches_failed += 1;
            }
        }
    }
}

fn step<T>(
    stage: Stage,
    reporter: &mut dyn StageReporter,
    work: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, StageError> {
    info!(%stage, "{}", stage.description());
    let result = work();
    reporter.stage_finished(stage, result.is_ok());

    result.map_err(|cause| {
        error!(%stage, error = %format!("{cause:#}"), "{}", stage.failure());
        StageError { stage, cause }
    })
}

/// Logs and diffs are limited to the sub-project unless it spans the whole
/// repository.
fn pathspec(project: &ProjectDescriptor) -> Option<&str> {
    (!project.is_whole_repository()).then_some(project.sub_project_path.as_str())
}

fn create_dir(path: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}
