use serde::{Deserialize, Serialize};

/// Placeholder written when a value cannot be derived.
pub const NOT_AVAILABLE: &str = "NA";

/// Column names of the bug registry CSV, in file order.
pub const BUGS_CSV_HEADER: [&str; 9] = [
    "bug.id",
    "project.id",
    "revision.id.buggy",
    "revision.id.fixed",
    "report.id",
    "report.url",
    "buggy_commit_url",
    "fixed_commit_url",
    "compare_url",
];

/// A bug-fixing commit paired with its parent.
///
/// Serialises to one row of the bug registry CSV with the columns of
/// [`BUGS_CSV_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugRecord {
    /// 1-based discovery order within a cross-referencing run.
    #[serde(rename = "bug.id")]
    pub version_id: u64,
    /// Project the commit belongs to.
    #[serde(rename = "project.id")]
    pub project_id: String,
    /// The fixing commit's only parent.
    #[serde(rename = "revision.id.buggy")]
    pub buggy_commit: String,
    /// The commit whose message references the issue.
    #[serde(rename = "revision.id.fixed")]
    pub fixed_commit: String,
    /// Issue token as it appears in the commit message.
    #[serde(rename = "report.id")]
    pub issue_id: String,
    /// Issue URL from the registry.
    #[serde(rename = "report.url")]
    pub issue_url: String,
    /// Browse URL of the buggy commit, or `NA`.
    pub buggy_commit_url: String,
    /// Browse URL of the fixed commit, or `NA`.
    pub fixed_commit_url: String,
    /// Compare URL between the two commits, or `NA`.
    pub compare_url: String,
}
