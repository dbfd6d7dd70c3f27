//! The in-memory issue registry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bugmine_trackers::IssueRecord;

/// Errors that can occur when loading an issue list.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The issue list could not be read from disk.
    #[error("failed to read issue list '{path}': {source}")]
    Read {
        /// Path to the issue list.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The issue list contained no `id,url` lines.
    #[error("issue list '{path}' contains no issues")]
    Empty {
        /// Path to the issue list.
        path: PathBuf,
    },
}

/// Case-insensitive mapping from issue id to issue URL.
///
/// Ids are stored lowercased. Inserting an id that is already present
/// replaces its URL.
#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    entries: HashMap<String, String>,
}

impl IssueRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `id,url` lines, skipping blanks and comments.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        content.lines().filter_map(IssueRecord::parse_line).collect()
    }

    /// Loads an issue list file. An unreadable file or one without any
    /// issues is an error.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let registry = Self::parse(&content);
        if registry.is_empty() {
            return Err(RegistryError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(registry)
    }

    /// Adds or replaces the URL for `id`.
    pub fn insert(&mut self, id: &str, url: impl Into<String>) {
        self.entries.insert(id.to_lowercase(), url.into());
    }

    /// Looks up the URL of an issue token, ignoring case.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(&token.to_lowercase()).map(String::as_str)
    }

    /// Number of distinct ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry holds no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<IssueRecord> for IssueRegistry {
    fn from_iter<I: IntoIterator<Item = IssueRecord>>(iter: I) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.insert(&record.id, record.url);
        }
        registry
    }
}
