//! UI helpers for consistent output formatting.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::run::{ProjectOutcome, ProjectStatus};

/// Single-character Unicode glyphs used as status indicators.
pub mod indicators {
    /// Error indicator (✖).
    pub const ERROR: &str = "✖";
    /// Warning indicator (⚠).
    pub const WARNING: &str = "⚠";
    /// Informational indicator (ℹ).
    pub const INFO: &str = "ℹ";
    /// Success indicator (✓).
    pub const SUCCESS: &str = "✓";
    /// Skipped indicator (–).
    pub const SKIPPED: &str = "–";
}

/// Semantic colour palette for terminal output.
pub mod colors {
    use console::Style;

    /// Red - errors and failed projects.
    pub const fn error() -> Style {
        Style::new().red()
    }

    /// Yellow - warnings and skipped projects.
    pub const fn warning() -> Style {
        Style::new().yellow()
    }

    /// Cyan - informational messages.
    pub const fn info() -> Style {
        Style::new().cyan()
    }

    /// Green - success messages.
    pub const fn success() -> Style {
        Style::new().green()
    }

    /// White bold - primary/headline text.
    pub const fn primary() -> Style {
        Style::new().white().bold()
    }

    /// Light grey - secondary descriptive text.
    pub const fn secondary() -> Style {
        Style::new().color256(252)
    }

    /// Dark grey - muted/contextual text.
    pub const fn muted() -> Style {
        Style::new().color256(243)
    }

    /// Cyan - accent highlights (project ids, commands).
    pub const fn accent() -> Style {
        Style::new().cyan()
    }
}

/// Process exit codes.
pub mod exit {
    /// The manifest or configuration could not be loaded.
    pub const ERROR: i32 = 2;
}

/// Column at which the stage status is printed.
const STAGE_LINE_WIDTH: usize = 60;

/// Prints a styled `bugmine <command>` header with surrounding blank lines.
pub fn print_command_header(command: &str) {
    println!();
    println!(
        "{} {}",
        colors::accent().bold().apply_to("bugmine"),
        colors::muted().apply_to(command)
    );
    println!();
}

/// Prints the banner that opens one project in serial mode.
pub fn print_project_header(project_id: &str, project_name: &str) {
    println!(
        "{} {}",
        colors::primary().apply_to(project_id),
        colors::muted().apply_to(format!("({project_name})"))
    );
}

/// Prints `description........ OK` or `description........ FAIL`.
pub fn print_stage(description: &str, ok: bool) {
    println!("  {}", stage_line(description, ok));
}

fn stage_line(description: &str, ok: bool) -> String {
    let dots = STAGE_LINE_WIDTH.saturating_sub(description.chars().count()).max(3);
    let status = if ok {
        colors::success().apply_to("OK")
    } else {
        colors::error().apply_to("FAIL")
    };
    format!(
        "{}{} {status}",
        colors::secondary().apply_to(description),
        colors::muted().apply_to(".".repeat(dots))
    )
}

/// Prints one project's final status line.
pub fn print_project_status(outcome: &ProjectOutcome) {
    let (indicator, style) = match outcome.status {
        ProjectStatus::Success => (indicators::SUCCESS, colors::success()),
        ProjectStatus::Skipped => (indicators::SKIPPED, colors::warning()),
        ProjectStatus::Failed => (indicators::ERROR, colors::error()),
    };

    let reason = outcome
        .reason
        .as_ref()
        .map(|r| format!(" {}", colors::muted().apply_to(format!("({r})"))));
    println!(
        "{} {} {}{}",
        style.apply_to(indicator),
        colors::accent().apply_to(&outcome.project_id),
        style.apply_to(outcome.status),
        reason.unwrap_or_default()
    );
}

/// Prints the closing table of a run.
pub fn print_run_summary(successful: usize, failed: usize, skipped: usize) {
    let total = successful + failed + skipped;
    println!();
    println!("{}", colors::primary().apply_to("Summary"));
    println!("  {:<12}{}", "Successful", colors::success().apply_to(successful));
    println!("  {:<12}{}", "Failed", colors::error().apply_to(failed));
    println!("  {:<12}{}", "Skipped", colors::warning().apply_to(skipped));
    println!("  {:<12}{}", "Total", colors::primary().apply_to(total));
}

/// Prints a red error message to stderr.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        colors::error().apply_to(indicators::ERROR),
        colors::secondary().apply_to(message)
    );
}

/// Prints a yellow warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        colors::warning().apply_to(indicators::WARNING),
        colors::secondary().apply_to(message)
    );
}

/// Prints a cyan informational message to stdout.
pub fn print_info(message: &str) {
    println!(
        "{} {}",
        colors::info().apply_to(indicators::INFO),
        colors::secondary().apply_to(message)
    );
}

/// Prints a green success message to stdout.
pub fn print_success(message: &str) {
    println!(
        "{} {}",
        colors::success().apply_to(indicators::SUCCESS),
        colors::secondary().apply_to(message)
    );
}

/// Returns `singular` when `count` is 1, otherwise `plural`.
#[must_use]
pub const fn pluralise_word<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

const PROGRESS_TICK_MS: u64 = 100;

/// Creates a progress bar counting finished projects.
#[must_use]
pub fn create_project_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);

    #[expect(
        clippy::expect_used,
        reason = "static template string; failure is a programmer error"
    )]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/243} {percent:>3}% {pos}/{len} projects ({elapsed} elapsed)")
            .expect("invalid progress template")
            .progress_chars("━━╸"),
    );

    pb.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    pb
}

/// Returns the shared clap colour theme used by all CLI subcommands.
#[must_use]
pub fn clap_styles() -> clap::builder::Styles {
    use clap::builder::styling::{AnsiColor, Effects, Style};

    clap::builder::Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .usage(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .literal(Style::new().fg_color(Some(AnsiColor::Cyan.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::BrightBlack.into())))
        .valid(Style::new().fg_color(Some(AnsiColor::Green.into())))
        .invalid(Style::new().fg_color(Some(AnsiColor::Red.into())))
        .error(
            Style::new()
                .fg_color(Some(AnsiColor::Red.into()))
                .effects(Effects::BOLD),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators_are_single_chars() {
        assert_eq!(indicators::ERROR.chars().count(), 1);
        assert_eq!(indicators::WARNING.chars().count(), 1);
        assert_eq!(indicators::INFO.chars().count(), 1);
        assert_eq!(indicators::SUCCESS.chars().count(), 1);
        assert_eq!(indicators::SKIPPED.chars().count(), 1);
    }

    #[test]
    fn test_pluralise_word() {
        assert_eq!(pluralise_word(0, "bug", "bugs"), "bugs");
        assert_eq!(pluralise_word(1, "bug", "bugs"), "bug");
        assert_eq!(pluralise_word(2, "bug", "bugs"), "bugs");
    }

    #[test]
    fn test_stage_line_pads_with_dots() {
        console::set_colors_enabled(false);
        let line = stage_line("Cloning repository", true);
        assert!(line.starts_with("Cloning repository..."));
        assert!(line.ends_with(" OK"));
        assert_eq!(line.chars().count(), STAGE_LINE_WIDTH + 3);
    }

    #[test]
    fn test_stage_line_keeps_dots_for_long_descriptions() {
        console::set_colors_enabled(false);
        let description = "x".repeat(STAGE_LINE_WIDTH + 10);
        let line = stage_line(&description, false);
        assert!(line.contains("... FAIL"));
    }
}
