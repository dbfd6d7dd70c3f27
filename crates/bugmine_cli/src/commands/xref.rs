//! Xref command - cross-references one commit log against one issue list.

use std::path::Path;

use anyhow::Context as _;
use bugmine_core::prelude::*;
use tracing::info;

use crate::XrefArgs;
use crate::git::Git;
use crate::pipeline::RepoParents;
use crate::ui::{pluralise_word, print_command_header, print_info, print_success, print_warning};

/// Executes `bugmine xref`.
///
/// New rows are appended to the registry; a new file gets the header row
/// first. Numbering continues after the highest id already present.
pub fn run(settings: &Settings, args: &XrefArgs) -> super::Result {
    print_command_header("xref");

    let issues = IssueRegistry::load(&args.issues)?;
    let pattern = BugPattern::new(&args.pattern, settings.pattern_options())?;
    let commits =
        CommitStream::open(&args.log).with_context(|| format!("failed to open {}", args.log.display()))?;

    let registry = BugRegistry::new(&args.output);
    let first_id = next_version_id(&registry)?;

    let git = Git::new(settings.debug);
    let parents = RepoParents::new(&git, &args.repository);
    let report = CrossReferencer::new(&pattern, &issues, &parents, &args.project_id, &args.repo_url)
        .with_first_version_id(first_id)
        .run(commits)
        .with_context(|| format!("failed to read {}", args.log.display()))?;

    if !registry.exists() {
        ensure_parent_dir(&args.output)?;
        registry.create()?;
    }
    registry.append(&report.records)?;

    let tally = report.tally;
    info!(
        examined = tally.examined,
        no_pattern_match = tally.no_pattern_match,
        unknown_issue = tally.unknown_issue,
        root = tally.root,
        merge = tally.merge,
        parent_unavailable = tally.parent_unavailable,
        "cross-reference complete"
    );

    let count = report.records.len();
    if count == 0 {
        print_warning("no commit matched the bug-fix pattern");
    } else {
        print_success(&format!(
            "{count} {} appended to {}",
            pluralise_word(count, "bug", "bugs"),
            args.output.display()
        ));
    }
    print_info(&format!(
        "{} {} examined",
        tally.examined,
        pluralise_word(tally.examined, "commit", "commits")
    ));
    Ok(())
}

/// Id following the highest numeric `bug.id` of an existing registry.
fn next_version_id(registry: &BugRegistry) -> anyhow::Result<u64> {
    if !registry.exists() {
        return Ok(1);
    }

    let highest = registry
        .read_rows()?
        .iter()
        .filter_map(|row| row.bug_id.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    Ok(highest + 1)
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display())),
        _ => Ok(()),
    }
}
