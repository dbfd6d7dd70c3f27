//! One project after another on the calling thread.

use std::fs;
use std::path::Path;

use bugmine_core::prelude::*;
use tracing::{debug, error, info_span, warn};

use super::{HTTP_CLIENT_UNAVAILABLE, ProjectOutcome, RunTally};
use crate::git::Git;
use crate::pipeline::{
    CacheLocks, HttpTrackers, IssueSource, MaterializeStats, Pipeline, ProjectLayout, ReportSource, Stage,
    StageReporter, Vcs,
};
use crate::ui::{print_info, print_project_header, print_project_status, print_stage, pluralise_word};

/// Prints a dotted `OK`/`FAIL` line per stage.
struct StageLines;

impl StageReporter for StageLines {
    fn stage_finished(&mut self, stage: Stage, ok: bool) {
        print_stage(stage.description(), ok);
    }
}

pub(super) fn run(settings: &Settings, manifest: &Manifest) -> RunTally {
    let git = Git::new(settings.debug);
    let locks = CacheLocks::new();
    let trackers = match HttpTrackers::new(settings) {
        Ok(trackers) => Some(trackers),
        Err(error) => {
            error!(error = %format!("{error:#}"), "could not create HTTP client");
            None
        }
    };

    mine_all(settings, manifest, &git, trackers.as_ref(), &locks)
}

/// Mines every entry in order. Without trackers each well-formed project
/// fails up front.
fn mine_all<V, T>(
    settings: &Settings,
    manifest: &Manifest,
    vcs: &V,
    trackers: Option<&T>,
    locks: &CacheLocks,
) -> RunTally
where
    V: Vcs,
    T: IssueSource + ReportSource,
{
    let mut tally = RunTally::default();
    for entry in &manifest.entries {
        let outcome = match (&entry.project, trackers) {
            (Ok(project), Some(trackers)) => mine(&Pipeline::new(settings, vcs, trackers, locks), settings, project),
            (Ok(project), None) => {
                print_project_header(&project.project_id, &project.project_name);
                ProjectOutcome::failed(&project.project_id, HTTP_CLIENT_UNAVAILABLE)
            }
            (Err(reason), _) => {
                warn!(line = entry.line_number, %reason, "skipping malformed manifest line");
                ProjectOutcome::skipped(entry.label(), reason.to_string())
            }
        };

        print_project_status(&outcome);
        tally.record(outcome.status);
    }

    tally
}

/// Mines one project; on failure its output directory is removed, caches
/// are kept.
fn mine<V, T>(pipeline: &Pipeline<'_, V, T>, settings: &Settings, project: &ProjectDescriptor) -> ProjectOutcome
where
    V: Vcs,
    T: IssueSource + ReportSource,
{
    let _span = info_span!("project", id = %project.project_id).entered();
    print_project_header(&project.project_id, &project.project_name);

    match pipeline.run(project, &mut StageLines) {
        Ok(stats) => {
            print_info(&describe(&stats));
            ProjectOutcome::success(&project.project_id)
        }
        Err(failure) => {
            error!(stage = %failure.stage(), error = %failure, "project failed");
            remove_output(&ProjectLayout::new(settings, project).output);
            ProjectOutcome::failed(&project.project_id, failure.reason())
        }
    }
}

fn describe(stats: &MaterializeStats) -> String {
    let patches = stats.patches_written + stats.patches_cached;
    let reports = stats.reports_written + stats.reports_cached;
    format!(
        "{} {}, {patches} {}, {reports} {}",
        stats.rows,
        pluralise_word(stats.rows, "bug", "bugs"),
        pluralise_word(patches, "patch", "patches"),
        pluralise_word(reports, "report", "reports"),
    )
}

fn remove_output(output: &Path) {
    if !output.exists() {
        debug!(dir = %output.display(), "no output directory to clean up");
        return;
    }

    match fs::remove_dir_all(output) {
        Ok(()) => warn!(dir = %output.display(), "removed output directory of failed project"),
        Err(error) => warn!(dir = %output.display(), %error, "could not remove output directory"),
    }
}
