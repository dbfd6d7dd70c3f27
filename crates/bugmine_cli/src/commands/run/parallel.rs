//! Projects mined concurrently on a bounded worker pool.
//!
//! Each worker sends its diagnostics to the project's own `mining.log` and
//! reports a single [`ProjectOutcome`] back to the controller, which prints
//! results in completion order.

use std::fs;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

use anyhow::Context as _;
use bugmine_core::prelude::*;
use tracing::{error, info};

use super::{HTTP_CLIENT_UNAVAILABLE, ProjectOutcome, RunTally};
use crate::git::Git;
use crate::logging;
use crate::pipeline::{CacheLocks, HttpTrackers, IssueSource, Pipeline, ProjectLayout, ReportSource, Vcs};
use crate::ui::{create_project_progress, pluralise_word, print_info, print_project_status};

/// Reason reported when a worker panics.
const WORKER_PANICKED: &str = "Unexpected worker error";

pub(super) fn run(settings: &Settings, manifest: &Manifest, workers: Option<usize>) -> anyhow::Result<RunTally> {
    let threads = worker_count(workers.or(settings.workers));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("bugmine-worker-{index}"))
        .build()
        .context("failed to build worker pool")?;

    print_info(&format!(
        "mining on {threads} {}, logs in <output>/<project>/mining.log",
        pluralise_word(threads, "worker", "workers")
    ));

    let git = Git::new(settings.debug);
    let locks = CacheLocks::new();
    let progress = create_project_progress(manifest.entries.len());
    let mut tally = RunTally::default();
    let (sender, receiver) = mpsc::channel::<ProjectOutcome>();

    pool.in_place_scope(|scope| {
        for entry in &manifest.entries {
            let sender = sender.clone();
            match &entry.project {
                Ok(project) => {
                    let (git, locks) = (&git, &locks);
                    scope.spawn(move |_| {
                        let outcome = isolate(&project.project_id, || {
                            mine_project(settings, git, locks, project, || HttpTrackers::new(settings))
                        });
                        // The receiver outlives every worker.
                        let _ = sender.send(outcome);
                    });
                }
                Err(reason) => {
                    let _ = sender.send(ProjectOutcome::skipped(entry.label(), reason.to_string()));
                }
            }
        }
        drop(sender);

        for outcome in receiver {
            progress.suspend(|| print_project_status(&outcome));
            progress.inc(1);
            tally.record(outcome.status);
        }
    });

    progress.finish_and_clear();
    Ok(tally)
}

fn worker_count(requested: Option<usize>) -> usize {
    requested
        .filter(|&count| count > 0)
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, NonZeroUsize::get))
}

/// Runs `work`, turning a panic into a `FAILED` outcome.
fn isolate(project_id: &str, work: impl FnOnce() -> ProjectOutcome) -> ProjectOutcome {
    panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| ProjectOutcome::failed(project_id, WORKER_PANICKED))
}

/// Mines one project with every event of this thread captured in the
/// project's `mining.log`. The output directory is kept on failure.
fn mine_project<V, T>(
    settings: &Settings,
    vcs: &V,
    locks: &CacheLocks,
    project: &ProjectDescriptor,
    trackers: impl FnOnce() -> anyhow::Result<T>,
) -> ProjectOutcome
where
    V: Vcs,
    T: IssueSource + ReportSource,
{
    let layout = ProjectLayout::new(settings, project);
    let id = project.project_id.as_str();

    if let Err(error) = fs::create_dir_all(&layout.output) {
        return ProjectOutcome::failed(id, format!("Output directory unavailable: {error}"));
    }
    let subscriber = match logging::project_subscriber(&layout.mining_log, settings.debug) {
        Ok(subscriber) => subscriber,
        Err(error) => return ProjectOutcome::failed(id, format!("Log file unavailable: {error}")),
    };

    tracing::subscriber::with_default(subscriber, || {
        info!(project = id, name = %project.project_name, repository = %project.repository_url, "processing project");

        let trackers = match trackers() {
            Ok(trackers) => trackers,
            Err(error) => {
                error!(error = %format!("{error:#}"), "could not create HTTP client");
                return ProjectOutcome::failed(id, HTTP_CLIENT_UNAVAILABLE);
            }
        };

        match Pipeline::new(settings, vcs, &trackers, locks).run(project, &mut ()) {
            Ok(_) => {
                info!(project = id, "finished project");
                ProjectOutcome::success(id)
            }
            Err(failure) => {
                error!(project = id, stage = %failure.stage(), error = %failure, "project failed");
                ProjectOutcome::failed(id, failure.reason())
            }
        }
    })
}
