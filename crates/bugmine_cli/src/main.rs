//! `bugmine` mines bug-fixing commits from the history of open-source
//! projects.
//!
//! # Commands
//!
//! - `bugmine run` - Mine every project declared in a manifest
//! - `bugmine xref` - Cross-reference one commit log against one issue list
//! - `bugmine issues` - Download a tracker's issue list
//! - `bugmine summarize` - Count mined bugs per project
//! - `bugmine init` - Create configuration file

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod git;
mod logging;
mod pipeline;
mod ui;

use std::path::{Path, PathBuf};

use bugmine_core::{SETTINGS_FILENAME, Settings, TrackerKind};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use console::style;

use crate::commands::run::RunOptions;
use crate::ui::colors;

const GH_TOKEN_ENV: &str = "GH_TOKEN";

#[derive(Debug, Parser)]
#[command(
    name = "bugmine",
    version,
    styles = ui::clap_styles(),
    arg_required_else_help = true,
)]
struct Cli {
    /// Path to `.bugmine.toml` configuration file.
    #[arg(short, long, global = true, value_name = "PATH", default_value = SETTINGS_FILENAME)]
    config: PathBuf,

    /// Log executed commands and their output.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mine every project declared in a manifest.
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Cross-reference one commit log against one issue list.
    #[command(visible_alias = "x")]
    Xref(XrefArgs),

    /// Download a tracker's issue list.
    #[command(visible_alias = "i")]
    Issues(IssuesArgs),

    /// Count mined bugs per project.
    #[command(visible_alias = "s")]
    Summarize(SummarizeArgs),

    /// Create a `.bugmine.toml` configuration file.
    Init(InitArgs),
}

/// Arguments for the `bugmine run` command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Tab-separated project manifest.
    #[arg(default_value = "projects.txt")]
    pub manifest: PathBuf,

    /// Mine projects concurrently.
    #[arg(short, long)]
    pub parallel: bool,

    /// Number of parallel workers (defaults to the available cores).
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Root of per-project output.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Root of reusable caches.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Arguments for the `bugmine xref` command.
#[derive(Debug, Parser)]
pub struct XrefArgs {
    /// Bug-fix pattern; its first capture group is the issue token.
    #[arg(short = 'e', long, value_name = "REGEX")]
    pub pattern: String,

    /// Commit log produced by `git log`.
    #[arg(short, long, value_name = "PATH")]
    pub log: PathBuf,

    /// Git directory used to resolve commit parents.
    #[arg(short, long, value_name = "DIR")]
    pub repository: PathBuf,

    /// Issue list with one `id,url` line per issue.
    #[arg(short, long, value_name = "PATH")]
    pub issues: PathBuf,

    /// Bug registry CSV to append to.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub output: PathBuf,

    /// Public repository URL used to derive browse links.
    #[arg(long, value_name = "URL")]
    pub repo_url: String,

    /// Project id written to every row.
    #[arg(long, value_name = "ID")]
    pub project_id: String,
}

/// Arguments for the `bugmine issues` command.
#[derive(Debug, Parser)]
pub struct IssuesArgs {
    /// Tracker family (google, jira, github, sourceforge, bugzilla).
    #[arg(short = 'g', long, value_name = "KIND")]
    pub tracker: TrackerKind,

    /// Project identifier on the tracker.
    #[arg(short = 't', long, value_name = "ID")]
    pub project: String,

    /// Output file of `id,url` lines.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub output: PathBuf,

    /// Directory for raw downloaded pages (defaults to the output's directory).
    #[arg(short = 'o', long, value_name = "DIR")]
    pub pages_dir: Option<PathBuf>,

    /// Owning organisation (GitHub only).
    #[arg(short = 'z', long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Tracker filter expression.
    #[arg(long, value_name = "QUERY")]
    pub query: Option<String>,

    /// Tracker base URI.
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,

    /// Page size.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Arguments for the `bugmine summarize` command.
#[derive(Debug, Parser)]
pub struct SummarizeArgs {
    /// Output directory to scan (defaults to the configured one).
    pub output_dir: Option<PathBuf>,

    /// Summary CSV to write.
    #[arg(short, long, value_name = "PATH", default_value = "bug_summary.csv")]
    pub output: PathBuf,
}

/// Arguments for the `bugmine init` command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

fn main() {
    let cli = parse_cli();

    if let Err(e) = run(cli) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => {
            let mut settings = load_settings(&cli.config, cli.debug)?;
            if let Some(dir) = args.output_dir {
                settings.output_dir = dir;
            }
            if let Some(dir) = args.cache_dir {
                settings.cache_dir = dir;
            }
            commands::run::run(
                &settings,
                RunOptions {
                    manifest: &args.manifest,
                    parallel: args.parallel,
                    workers: args.workers,
                },
            )
        }
        Command::Xref(args) => commands::xref::run(&load_settings(&cli.config, cli.debug)?, &args),
        Command::Issues(args) => commands::issues::run(&load_settings(&cli.config, cli.debug)?, &args),
        Command::Summarize(args) => commands::summarize::run(&load_settings(&cli.config, cli.debug)?, &args),
        Command::Init(args) => commands::init::run(&cli.config, args.force),
    }
}

/// Loads `.bugmine.toml`, applies the global overrides, and installs the
/// stderr subscriber.
fn load_settings(path: &Path, debug: bool) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(path)?;
    settings.debug |= debug;
    if let Ok(token) = std::env::var(GH_TOKEN_ENV)
        && !token.is_empty()
    {
        settings.github_token = Some(token);
    }

    logging::init(settings.debug);
    Ok(settings)
}

fn build_about() -> String {
    format!(
        r"
  {} mines bug-fixing commits from project histories.

  Clones each repository, downloads its issue list, matches commit
  messages against issue ids, and writes every fix as a buggy/fixed
  commit pair with its patch and issue report.",
        colors::accent().apply_to("bugmine").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r"
  {}
    bugmine run                        Mine projects.txt one by one
    bugmine run projects.txt -p        Mine in parallel
    bugmine run -p -w 4                Mine on four workers
    bugmine summarize                  Count bugs per project
    bugmine issues -g jira -t LANG -f issues.txt
                                       Download an issue list
    bugmine init                       Create config file",
        style("Examples:").bold()
    )
}
