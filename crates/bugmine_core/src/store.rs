//! The append-only bug registry CSV (`active-bugs.csv`).

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::record::{BUGS_CSV_HEADER, BugRecord, NOT_AVAILABLE};

const COL_BUG_ID: &str = "bug.id";
const COL_BUGGY: &str = "revision.id.buggy";
const COL_FIXED: &str = "revision.id.fixed";
const COL_REPORT_URL: &str = "report.url";

/// Errors that can occur when reading or writing the bug registry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be opened or written.
    #[error("failed to access bug registry '{path}': {source}")]
    Io {
        /// Path to the registry file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer failed.
    #[error("malformed bug registry '{path}': {source}")]
    Csv {
        /// Path to the registry file.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// The file has no header row.
    #[error("bug registry '{path}' has no header row")]
    MissingHeader {
        /// Path to the registry file.
        path: PathBuf,
    },

    /// The header lacks a required column.
    #[error("bug registry '{path}' has no '{column}' column")]
    MissingColumn {
        /// Path to the registry file.
        path: PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },
}

/// The columns of one registry row needed to materialise artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugRow {
    /// Value of `bug.id`.
    pub bug_id: String,
    /// Value of `revision.id.buggy`.
    pub buggy_commit: String,
    /// Value of `revision.id.fixed`.
    pub fixed_commit: String,
    /// Value of `report.url`.
    pub report_url: String,
}

impl BugRow {
    /// Returns the report URL unless it is empty or `NA`.
    #[must_use]
    pub fn report_url(&self) -> Option<&str> {
        let url = self.report_url.trim();
        (!url.is_empty() && url != NOT_AVAILABLE).then_some(url)
    }

    /// Returns `true` when both commit hashes are present.
    #[must_use]
    pub fn has_commits(&self) -> bool {
        !self.buggy_commit.trim().is_empty() && !self.fixed_commit.trim().is_empty()
    }
}

/// Handle to a project's bug registry CSV.
#[derive(Debug, Clone)]
pub struct BugRegistry {
    path: PathBuf,
}

impl BugRegistry {
    /// Creates a handle; nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the CSV file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Creates the file with only the header row, truncating any content.
    pub fn create(&self) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path).map_err(|e| self.csv_error(e))?;
        writer.write_record(BUGS_CSV_HEADER).map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|source| self.io_error(source))
    }

    /// Appends one row per record without touching existing rows.
    pub fn append(&self, records: &[BugRecord]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        for record in records {
            writer.serialize(record).map_err(|e| self.csv_error(e))?;
        }
        writer.flush().map_err(|source| self.io_error(source))
    }

    /// Reads every row back by column name.
    ///
    /// Rows that cannot be parsed or that lack a required column are
    /// skipped.
    pub fn read_rows(&self) -> Result<Vec<BugRow>, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        if headers.is_empty() {
            return Err(StoreError::MissingHeader {
                path: self.path.clone(),
            });
        }

        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| StoreError::MissingColumn {
                    path: self.path.clone(),
                    column: name,
                })
        };
        let bug_id_col = column(COL_BUG_ID)?;
        let buggy_col = column(COL_BUGGY)?;
        let fixed_col = column(COL_FIXED)?;
        let report_url_col = column(COL_REPORT_URL)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(path = %self.path.display(), %error, "skipping unreadable row");
                    #[cfg(not(feature = "tracing"))]
                    let _ = error;
                    continue;
                }
            };

            let field = |index: usize| record.get(index).map(|value| value.trim().to_string());
            if let (Some(bug_id), Some(buggy_commit), Some(fixed_commit), Some(report_url)) =
                (field(bug_id_col), field(buggy_col), field(fixed_col), field(report_url_col))
            {
                rows.push(BugRow {
                    bug_id,
                    buggy_commit,
                    fixed_commit,
                    report_url,
                });
            }
        }
        Ok(rows)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn record(version_id: u64, fixed: &str) -> BugRecord {
        BugRecord {
            version_id,
            project_id: "Demo".into(),
            buggy_commit: format!("{fixed}^"),
            fixed_commit: fixed.into(),
            issue_id: format!("ABC-{version_id}"),
            issue_url: format!("http://x/{version_id}"),
            buggy_commit_url: "NA".into(),
            fixed_commit_url: "NA".into(),
            compare_url: "NA".into(),
        }
    }

    #[test]
    fn create_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let registry = BugRegistry::new(dir.path().join("active-bugs.csv"));
        assert!(!registry.exists());

        registry.create().unwrap();

        assert!(registry.exists());
        assert_eq!(
            fs::read_to_string(registry.path()).unwrap(),
            format!("{}\n", BUGS_CSV_HEADER.join(","))
        );
        assert!(registry.read_rows().unwrap().is_empty());
    }

    #[test]
    fn append_keeps_existing_rows() {
        let dir = TempDir::new().unwrap();
        let registry = BugRegistry::new(dir.path().join("active-bugs.csv"));
        registry.create().unwrap();

        registry.append(&[record(1, "c1")]).unwrap();
        registry.append(&[record(2, "c2")]).unwrap();

        let rows = registry.read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bug_id, "1");
        assert_eq!(rows[1].fixed_commit, "c2");
        assert_eq!(rows[1].report_url(), Some("http://x/2"));
        let content = fs::read_to_string(registry.path()).unwrap();
        assert_eq!(content.matches("bug.id").count(), 1);
    }

    #[test]
    fn read_rows_uses_column_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("active-bugs.csv");
        fs::write(
            &path,
            "report.url,extra,revision.id.fixed,revision.id.buggy,bug.id\nNA,?,c9,p9,9\nshort\n",
        )
        .unwrap();

        let rows = BugRegistry::new(path).read_rows().unwrap();
        assert_eq!(
            rows,
            vec![BugRow {
                bug_id: "9".into(),
                buggy_commit: "p9".into(),
                fixed_commit: "c9".into(),
                report_url: "NA".into(),
            }]
        );
        assert_eq!(rows[0].report_url(), None);
        assert!(rows[0].has_commits());
    }

    #[test]
    fn read_rows_rejects_headerless_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("active-bugs.csv");
        fs::write(&path, "").unwrap();

        let err = BugRegistry::new(path).read_rows().unwrap_err();
        assert!(matches!(err, StoreError::MissingHeader { .. }));
    }

    #[test]
    fn read_rows_rejects_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("active-bugs.csv");
        fs::write(&path, "bug.id,revision.id.buggy\n1,p1\n").unwrap();

        let err = BugRegistry::new(path).read_rows().unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn { column: "revision.id.fixed", .. }));
    }

    #[test]
    fn read_rows_on_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(BugRegistry::new(dir.path().join("absent.csv")).read_rows().is_err());
    }

    #[test]
    fn blank_commits_are_reported() {
        let row = BugRow {
            bug_id: "1".into(),
            buggy_commit: String::new(),
            fixed_commit: "c1".into(),
            report_url: String::new(),
        };
        assert!(!row.has_commits());
        assert_eq!(row.report_url(), None);
    }
}
