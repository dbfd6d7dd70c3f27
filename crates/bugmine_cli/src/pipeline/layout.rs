//! On-disk locations of one project's caches and artifacts.

use std::path::PathBuf;

use bugmine_core::prelude::*;
use bugmine_trackers::ReportFormat;

const ISSUES_FILENAME: &str = "issues.txt";
const LOG_FILENAME: &str = "gitlog.txt";
const BUGS_CSV_FILENAME: &str = "active-bugs.csv";
const MINING_LOG_FILENAME: &str = "mining.log";
const PATCH_SUFFIX: &str = ".src.patch";

/// Every path the pipeline reads or writes for one project.
///
/// Caches live under the configured cache directory and survive failures;
/// artifacts live under `<output>/<project_id>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// `<cache>/<project_id>/`.
    pub project_cache: PathBuf,
    /// `<cache>/<project_id>/<project_name>.git`.
    pub repository: PathBuf,
    /// `<cache>/<project_id>/gitlog.txt`.
    pub log: PathBuf,
    /// `<cache>/shared_issues/<tracker>_<tracker_project_id>/`.
    pub issues_dir: PathBuf,
    /// `<issues_dir>/issues.txt`.
    pub issues: PathBuf,
    /// `<output>/<project_id>/`.
    pub output: PathBuf,
    /// `<output>/<project_id>/active-bugs.csv`.
    pub bugs_csv: PathBuf,
    /// `<output>/<project_id>/patches/`.
    pub patches: PathBuf,
    /// `<output>/<project_id>/reports/`.
    pub reports: PathBuf,
    /// `<output>/<project_id>/mining.log`.
    pub mining_log: PathBuf,
}

impl ProjectLayout {
    /// Resolves the layout of `project` under the configured directories.
    #[must_use]
    pub fn new(settings: &Settings, project: &ProjectDescriptor) -> Self {
        let project_cache = settings.cache_dir.join(&project.project_id);
        let issues_dir = settings.shared_issues_dir().join(project.issue_cache_key());
        let output = settings.output_dir.join(&project.project_id);

        Self {
            repository: project_cache.join(format!("{}.git", project.project_name)),
            log: project_cache.join(LOG_FILENAME),
            project_cache,
            issues: issues_dir.join(ISSUES_FILENAME),
            issues_dir,
            bugs_csv: output.join(BUGS_CSV_FILENAME),
            patches: output.join("patches"),
            reports: output.join("reports"),
            mining_log: output.join(MINING_LOG_FILENAME),
            output,
        }
    }

    /// `<patches>/<bug_id>.src.patch`.
    #[must_use]
    pub fn patch_path(&self, bug_id: &str) -> PathBuf {
        self.patches.join(format!("{bug_id}{PATCH_SUFFIX}"))
    }

    /// `<reports>/<bug_id>.<xml|json>`.
    #[must_use]
    pub fn report_path(&self, bug_id: &str, format: ReportFormat) -> PathBuf {
        self.reports.join(format!("{bug_id}.{}", format.extension()))
    }

    /// Returns the bug registry file as a [`BugRegistry`].
    #[must_use]
    pub fn bug_registry(&self) -> BugRegistry {
        BugRegistry::new(&self.bugs_csv)
    }
}
