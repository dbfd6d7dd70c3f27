//! Issue tracker adapters for bugmine.
//!
//! This crate knows how to turn a tracker kind plus a tracker project id into
//! a sequence of paginated fetch URLs, how to parse each page into
//! [`IssueRecord`]s, and how to download the full report for a single issue.
//!
//! Tracker selection goes through the closed [`TrackerKind`] enumeration;
//! every kind has exactly one [`Tracker`] implementation.

mod client;
mod issue;
mod kind;
mod report;
mod tracker;
/// Tracker implementations, one module per supported tracker.
pub mod trackers;

pub use client::{TrackerClient, TrackerError};
pub use issue::IssueRecord;
pub use kind::{ParseTrackerKindError, TrackerKind};
pub use report::{ReportFormat, report_format, report_source_url};
pub use tracker::{PageError, Tracker, TrackerQuery, tracker_for};

/// HTTP `User-Agent` header sent with every tracker request.
pub(crate) const USER_AGENT: &str = concat!("bugmine/", env!("CARGO_PKG_VERSION"));
