//! CLI command handlers.

/// `.bugmine.toml` creation.
pub mod init;
/// Standalone issue list download.
pub mod issues;
/// Manifest-driven mining, serial or parallel.
pub mod run;
/// Per-project bug counts across an output directory.
pub mod summarize;
/// Standalone cross-reference of one commit log.
pub mod xref;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;
