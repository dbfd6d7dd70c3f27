//! Issues command - downloads one tracker project's issue list.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use bugmine_core::Settings;
use bugmine_core::fs_util::atomic_write;
use bugmine_trackers::{IssueRecord, TrackerQuery};

use crate::IssuesArgs;
use crate::pipeline::{HttpTrackers, IssueSource};
use crate::ui::{pluralise_word, print_command_header, print_info, print_success};

/// Executes `bugmine issues`.
pub fn run(settings: &Settings, args: &IssuesArgs) -> super::Result {
    print_command_header("issues");

    let query = build_query(args);
    let pages_dir = pages_dir(args);
    std::fs::create_dir_all(&pages_dir).with_context(|| format!("failed to create {}", pages_dir.display()))?;

    print_info(&format!("fetching {} issues from {}", query.project, query.base_uri));
    let trackers = HttpTrackers::new(settings)?;
    let count = download(&trackers, &query, &pages_dir, &args.output)?;

    print_success(&format!(
        "{count} {} written to {}",
        pluralise_word(count, "issue", "issues"),
        args.output.display()
    ));
    Ok(())
}

fn build_query(args: &IssuesArgs) -> TrackerQuery {
    let mut query = TrackerQuery::new(args.tracker, &args.project).with_organization(args.organization.clone());
    if let Some(uri) = &args.uri {
        query = query.with_base_uri(uri);
    }
    if let Some(filter) = &args.query {
        query = query.with_query(filter);
    }
    if let Some(limit) = args.limit {
        query = query.with_limit(limit);
    }
    query
}

/// Raw pages land next to the output file unless a directory is given.
fn pages_dir(args: &IssuesArgs) -> PathBuf {
    if let Some(dir) = &args.pages_dir {
        return dir.clone();
    }
    match args.output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Fetches every issue and writes the `id,url` list. An empty result is an
/// error and leaves `output` untouched.
fn download(source: &impl IssueSource, query: &TrackerQuery, pages_dir: &Path, output: &Path) -> anyhow::Result<usize> {
    let records = source
        .fetch_issues(query, pages_dir)
        .with_context(|| format!("failed to download issues for {}", query.project))?;

    if records.is_empty() {
        bail!("tracker returned no issues for {}", query.project);
    }

    atomic_write(output, &render(&records)).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(records.len())
}

fn render(records: &[IssueRecord]) -> String {
    records.iter().map(|record| format!("{record}\n")).collect()
}
