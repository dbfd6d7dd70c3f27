use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::matcher::PatternOptions;

const DEFAULT_OUTPUT_DIR: &str = "bug-mining";
const DEFAULT_CACHE_DIR: &str = "cache";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;
const SHARED_ISSUES_DIR: &str = "shared_issues";

/// Run configuration loaded from `.bugmine.toml`.
///
/// Every field is optional in the file. Command-line flags override the
/// loaded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of per-project output (`active-bugs.csv`, patches, reports).
    pub output_dir: PathBuf,

    /// Root of reusable caches (bare clones, logs, shared issue lists).
    pub cache_dir: PathBuf,

    /// Worker count for parallel runs. Defaults to the number of CPUs.
    pub workers: Option<usize>,

    /// Log executed commands and their output.
    pub debug: bool,

    /// Per-request timeout for tracker downloads, in seconds.
    pub http_timeout_secs: u64,

    /// Compile bug-fix patterns case-insensitively.
    pub case_insensitive: bool,

    /// Compile bug-fix patterns in multi-line mode.
    pub multi_line: bool,

    /// Token sent to the GitHub API. The `GH_TOKEN` environment variable
    /// takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            workers: None,
            debug: false,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            case_insensitive: false,
            multi_line: false,
            github_token: None,
        }
    }
}

impl Settings {
    /// Creates settings with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a `.bugmine.toml` file.
    ///
    /// Returns the defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Serialises these settings to a pretty-printed TOML string.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|source| SettingsError::Serialize { source })
    }

    /// Atomically writes these settings to a `.bugmine.toml` file.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = self.to_toml()?;
        crate::fs_util::atomic_write(path, &content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Regex flags for bug-fix patterns.
    #[must_use]
    pub fn pattern_options(&self) -> PatternOptions {
        PatternOptions {
            case_insensitive: self.case_insensitive,
            multi_line: self.multi_line,
        }
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Directory holding issue lists shared between projects.
    #[must_use]
    pub fn shared_issues_dir(&self) -> PathBuf {
        self.cache_dir.join(SHARED_ISSUES_DIR)
    }
}

/// Errors that can occur when reading, parsing, serialising, or writing
/// a `.bugmine.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read from disk.
    #[error("failed to read settings '{path}': {source}")]
    Read {
        /// Path to the settings file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file contained invalid TOML or unexpected values.
    #[error("failed to parse settings '{path}': {source}")]
    Parse {
        /// Path to the settings file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// The in-memory settings could not be serialised to TOML.
    #[error("failed to serialise settings: {source}")]
    Serialize {
        /// The underlying TOML serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// The settings file could not be written to disk.
    #[error("failed to write settings '{path}': {source}")]
    Write {
        /// Path to the settings file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SettingsError {
    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Serialize { .. } => None,
        }
    }
}
