//! Summarize command - counts mined bugs per project.

use anyhow::Context as _;
use bugmine_core::{Settings, summarize_output, write_summary};

use crate::SummarizeArgs;
use crate::ui::{colors, pluralise_word, print_command_header, print_success, print_warning};

/// Executes `bugmine summarize`.
pub fn run(settings: &Settings, args: &SummarizeArgs) -> super::Result {
    print_command_header("summarize");

    let output_dir = args.output_dir.as_deref().unwrap_or(&settings.output_dir);
    let summaries = summarize_output(output_dir)
        .with_context(|| format!("failed to summarise {}", output_dir.display()))?;

    if summaries.is_empty() {
        print_warning(&format!("no mined bugs found in {}", output_dir.display()));
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "  {}{}",
            colors::accent().apply_to(format!("{:<24}", summary.project_id)),
            colors::primary().apply_to(summary.bug_count)
        );
    }

    write_summary(&args.output, &summaries)?;

    let bugs: usize = summaries.iter().map(|s| s.bug_count).sum();
    println!();
    print_success(&format!(
        "{bugs} {} across {} {} written to {}",
        pluralise_word(bugs, "bug", "bugs"),
        summaries.len(),
        pluralise_word(summaries.len(), "project", "projects"),
        args.output.display()
    ));
    Ok(())
}
