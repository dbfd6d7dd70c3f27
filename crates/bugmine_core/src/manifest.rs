//! Project declarations.
//!
//! A manifest is a text file with one tab-separated project per line:
//!
//! ```text
//! project_id  project_name  repository_url  tracker  tracker_project_id  bug_fix_pattern  [sub_project_path]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Malformed lines are
//! kept with the reason they were rejected so callers can report them.

use std::fmt;
use std::path::{Path, PathBuf};

use bugmine_trackers::{ParseTrackerKindError, TrackerKind};

const REQUIRED_FIELDS: usize = 6;
const ROOT_PATH: &str = ".";

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file does not exist.
    #[error("manifest not found: '{path}'")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The manifest file exists but could not be read.
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        /// Path to the manifest.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// One project to mine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Identifier used for output and cache directories.
    pub project_id: String,
    /// Name of the cloned bare repository.
    pub project_name: String,
    /// Clone URL.
    pub repository_url: String,
    /// Issue tracker family.
    pub tracker: TrackerKind,
    /// The project's identifier on the tracker.
    pub tracker_project_id: String,
    /// Regex whose first group captures the issue token.
    pub bug_fix_pattern: String,
    /// Path inside the repository that logs and diffs are restricted to.
    /// `.` means the whole repository.
    pub sub_project_path: String,
}

impl ProjectDescriptor {
    /// Key of the shared issue cache: `{tracker}_{tracker_project_id}`.
    #[must_use]
    pub fn issue_cache_key(&self) -> String {
        format!("{}_{}", self.tracker, self.tracker_project_id)
    }

    /// Returns `true` when logs and diffs cover the whole repository.
    #[must_use]
    pub fn is_whole_repository(&self) -> bool {
        self.sub_project_path == ROOT_PATH
    }

    /// Parses one tab-separated manifest line.
    pub fn parse_line(line: &str) -> Result<Self, MalformedLine> {
        let fields: Vec<&str> = line.trim().split('\t').map(str::trim).collect();
        if fields.len() < REQUIRED_FIELDS {
            return Err(MalformedLine::TooFewFields { found: fields.len() });
        }

        let required = |index: usize, name: &'static str| {
            let value = fields[index];
            if value.is_empty() {
                Err(MalformedLine::EmptyField(name))
            } else {
                Ok(value.to_string())
            }
        };

        let tracker = fields[3].parse::<TrackerKind>().map_err(MalformedLine::UnknownTracker)?;
        let sub_project_path = match fields.get(6) {
            Some(path) if !path.is_empty() => (*path).to_string(),
            _ => ROOT_PATH.to_string(),
        };

        Ok(Self {
            project_id: required(0, "project_id")?,
            project_name: required(1, "project_name")?,
            repository_url: required(2, "repository_url")?,
            tracker,
            tracker_project_id: required(4, "tracker_project_id")?,
            bug_fix_pattern: required(5, "bug_fix_pattern")?,
            sub_project_path,
        })
    }
}

/// Why a manifest line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedLine {
    /// Fewer than six tab-separated fields.
    TooFewFields {
        /// Number of fields present.
        found: usize,
    },
    /// The tracker name is not supported.
    UnknownTracker(ParseTrackerKindError),
    /// A required field is blank.
    EmptyField(&'static str),
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFields { found } => {
                write!(f, "expected at least {REQUIRED_FIELDS} tab-separated fields, found {found}")
            }
            Self::UnknownTracker(e) => fmt::Display::fmt(e, f),
            Self::EmptyField(name) => write!(f, "field '{name}' is empty"),
        }
    }
}

/// A non-comment manifest line and how it parsed.
#[derive(Debug, Clone)]
pub struct ManifestLine {
    /// 1-based line number in the file.
    pub line_number: usize,
    /// The raw line, trimmed.
    pub raw: String,
    /// The parsed project, or why it was rejected.
    pub project: Result<ProjectDescriptor, MalformedLine>,
}

impl ManifestLine {
    /// Label used when reporting this line: the project id if parsed,
    /// otherwise the first field or the line number.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.project {
            Ok(project) => project.project_id.clone(),
            Err(_) => self
                .raw
                .split('\t')
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map_or_else(|| format!("line {}", self.line_number), String::from),
        }
    }
}

/// All entries of a manifest file, in file order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Non-blank, non-comment lines.
    pub entries: Vec<ManifestLine>,
}

impl Manifest {
    /// Loads a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parses manifest text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let raw = line.trim();
                if raw.is_empty() || raw.starts_with('#') {
                    return None;
                }
                Some(ManifestLine {
                    line_number: index + 1,
                    raw: raw.to_string(),
                    project: ProjectDescriptor::parse_line(raw),
                })
            })
            .collect();
        Self { entries }
    }
}
