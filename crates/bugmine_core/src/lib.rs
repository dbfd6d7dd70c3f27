//! Core mining engine for bugmine.
//!
//! This crate turns a commit log and an issue list into a registry of
//! bug-fixing commit pairs. It knows nothing about git or HTTP: parent
//! lookups go through the [`ParentResolver`] trait and issue lists arrive as
//! plain `id,url` text.
//!
//! # Main Types
//!
//! - [`CommitStream`] - Splits a `git log` stream into [`CommitEntry`] values
//! - [`CrossReferencer`] - Matches commits against a [`BugPattern`] and an
//!   [`IssueRegistry`], emitting [`BugRecord`]s
//! - [`BugRegistry`] - The append-only `active-bugs.csv` file
//! - [`Manifest`] - Project declarations read from a tab-separated file
//! - [`Settings`] - User configuration loaded from `.bugmine.toml`
//!
//! # Error Handling
//!
//! Errors are [`thiserror`] enums carrying the path they relate to:
//!
//! - [`PatternError`] - Bug-fix pattern compilation failures
//! - [`RegistryError`] - Issue list loading failures
//! - [`StoreError`] - Bug registry CSV failures
//! - [`ManifestError`] - Manifest loading failures
//! - [`SettingsError`] - Configuration loading/parsing failures
//! - [`MineError`] - Top-level error enum combining the above
//!
//! The CLI crate (`bugmine_cli`) uses `anyhow` for error propagation.

/// Error types for pattern compilation and the combined mining error.
pub mod error;
/// Filesystem helpers for atomic writes and cache checks.
pub mod fs_util;
/// Streaming parser for `git log` output.
pub mod log;
/// Project declarations read from a manifest file.
pub mod manifest;
/// Bug-fix pattern matching and commit cross-referencing.
pub mod matcher;
/// Common re-exports for internal use.
pub mod prelude;
/// The bug record type and its CSV schema.
pub mod record;
/// Case-insensitive issue id to URL lookup.
pub mod registry;
/// User configuration loaded from `.bugmine.toml`.
pub mod settings;
/// The append-only bug registry CSV.
pub mod store;
/// Per-project bug counts across an output directory.
pub mod summary;
/// Browse and compare URLs for hosted repositories.
pub mod url;

pub use bugmine_trackers::{IssueRecord, TrackerKind};
pub use error::{MineError, PatternError};
pub use log::{CommitEntry, CommitStream};
pub use manifest::{MalformedLine, Manifest, ManifestError, ManifestLine, ProjectDescriptor};
pub use matcher::{
    Ancestry, BugPattern, CrossReferencer, MatchOutcome, ParentResolver, PatternOptions, XrefReport, XrefTally,
};
pub use record::{BUGS_CSV_HEADER, BugRecord, NOT_AVAILABLE};
pub use registry::{IssueRegistry, RegistryError};
pub use settings::{Settings, SettingsError};
pub use store::{BugRegistry, BugRow, StoreError};
pub use summary::{ProjectSummary, issue_number, summarize_output, write_summary};
pub use url::{commit_url, compare_url};

/// Default filename for bugmine configuration.
pub const SETTINGS_FILENAME: &str = ".bugmine.toml";
