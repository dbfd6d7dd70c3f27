//! Run command - mines every project declared in a manifest.

mod parallel;
mod serial;

use std::fmt;
use std::path::Path;

use anyhow::Context as _;
use bugmine_core::prelude::*;

use crate::ui::{print_command_header, print_info, print_run_summary, pluralise_word};

/// Options of `bugmine run`.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Tab-separated project manifest.
    pub manifest: &'a Path,
    /// Mine projects concurrently.
    pub parallel: bool,
    /// Worker count for parallel mode; defaults to the available cores.
    pub workers: Option<usize>,
}

/// Executes `bugmine run`.
///
/// Only an unreadable manifest is an error; failed projects are reported and
/// the run continues with the next one.
pub fn run(settings: &Settings, options: RunOptions<'_>) -> super::Result {
    let manifest = Manifest::load(options.manifest)
        .with_context(|| format!("failed to load manifest {}", options.manifest.display()))?;

    print_command_header("run");
    let count = manifest.entries.len();
    print_info(&format!(
        "{count} {} in {}",
        pluralise_word(count, "project", "projects"),
        options.manifest.display()
    ));

    let tally = if options.parallel {
        parallel::run(settings, &manifest, options.workers)?
    } else {
        serial::run(settings, &manifest)
    };

    print_run_summary(tally.successful, tally.failed, tally.skipped);
    Ok(())
}

/// Reason reported when the tracker HTTP client cannot be built.
const HTTP_CLIENT_UNAVAILABLE: &str = "HTTP client unavailable";

/// Final status of one manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Every stage succeeded.
    Success,
    /// A stage failed or the worker died.
    Failed,
    /// The manifest line could not be parsed.
    Skipped,
}

impl ProjectStatus {
    /// Upper-case label printed in status lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(project_id, status, reason)` as collected by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    /// Project id, or a label for unparseable lines.
    pub project_id: String,
    /// Final status.
    pub status: ProjectStatus,
    /// Why the project failed or was skipped.
    pub reason: Option<String>,
}

impl ProjectOutcome {
    fn success(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            status: ProjectStatus::Success,
            reason: None,
        }
    }

    fn failed(project_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            status: ProjectStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    fn skipped(project_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            status: ProjectStatus::Skipped,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunTally {
    successful: usize,
    failed: usize,
    skipped: usize,
}

impl RunTally {
    const fn record(&mut self, status: ProjectStatus) {
        match status {
            ProjectStatus::Success => self.successful += 1,
            ProjectStatus::Failed => self.failed += 1,
            ProjectStatus::Skipped => self.skipped += 1,
        }
    }
}
