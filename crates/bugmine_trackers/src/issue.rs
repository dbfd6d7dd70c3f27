//! Issue identifier and URL pairs produced by tracker adapters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single issue known to a tracker: its identifier and browse URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Tracker-assigned identifier (e.g. `"LANG-123"` or `"42"`).
    pub id: String,
    /// Public URL of the issue.
    pub url: String,
}

impl IssueRecord {
    /// Creates a record from an identifier and URL.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Parses one `id,url` line. Returns `None` for blank lines, comments,
    /// and lines without a separator.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (id, url) = line.split_once(',')?;
        Some(Self::new(id.trim(), url.trim()))
    }
}

/// Formats as an `id,url` line without a trailing newline.
impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.id, self.url)
    }
}
