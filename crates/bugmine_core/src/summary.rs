//! Bug counts per project across an output directory.

use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::store::StoreError;

const BUGS_FILE: &str = "active-bugs.csv";
const ISSUE_COLUMN: &str = "report.id";
const SUMMARY_HEADER: [&str; 3] = ["project_id", "bug_count", "issue_ids"];

/// Bug count and issue numbers of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Output directory name.
    pub project_id: String,
    /// Number of rows in the project's registry.
    pub bug_count: usize,
    /// Issue numbers, in row order.
    pub issue_ids: Vec<String>,
}

/// Reduces an issue id to its first run of digits (`LANG-12` becomes `12`).
/// Ids without digits are returned unchanged.
#[must_use]
pub fn issue_number(issue_id: &str) -> &str {
    let Some(start) = issue_id.find(|c: char| c.is_ascii_digit()) else {
        return issue_id;
    };
    let rest = &issue_id[start..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    &rest[..end]
}

/// Summarises every `<output_dir>/<project>/active-bugs.csv`, sorted by
/// project directory name.
///
/// Projects without a registry, with an empty or headerless registry, or
/// with no rows are left out.
pub fn summarize_output(output_dir: &Path) -> Result<Vec<ProjectSummary>, StoreError> {
    let io_error = |source| StoreError::Io {
        path: output_dir.to_path_buf(),
        source,
    };

    let mut projects: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(output_dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let csv_path = entry.path().join(BUGS_FILE);
        if entry.path().is_dir() && csv_path.is_file() {
            projects.push((entry.file_name().to_string_lossy().into_owned(), csv_path));
        }
    }
    projects.sort();

    let mut summaries = Vec::new();
    for (project_id, csv_path) in projects {
        match summarize_project(&project_id, &csv_path) {
            Ok(Some(summary)) => summaries.push(summary),
            Ok(None) => {
                #[cfg(feature = "tracing")]
                debug!(project = %project_id, "no bug rows");
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                warn!(project = %project_id, %error, "skipping project");
                #[cfg(not(feature = "tracing"))]
                let _ = error;
            }
        }
    }
    Ok(summaries)
}

fn summarize_project(project_id: &str, csv_path: &Path) -> Result<Option<ProjectSummary>, StoreError> {
    let csv_error = |source| StoreError::Csv {
        path: csv_path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?;
    if headers.is_empty() {
        return Ok(None);
    }
    let column = headers
        .iter()
        .position(|h| h.trim() == ISSUE_COLUMN)
        .ok_or_else(|| StoreError::MissingColumn {
            path: csv_path.to_path_buf(),
            column: ISSUE_COLUMN,
        })?;

    let issue_ids: Vec<String> = reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| record.get(column).map(|id| issue_number(id.trim()).to_string()))
        .collect();

    if issue_ids.is_empty() {
        return Ok(None);
    }
    Ok(Some(ProjectSummary {
        project_id: project_id.to_string(),
        bug_count: issue_ids.len(),
        issue_ids,
    }))
}

/// Writes `bug_summary.csv` with one `project_id,bug_count,issue_ids` row
/// per project; the ids are comma-joined inside one quoted field.
pub fn write_summary(path: &Path, summaries: &[ProjectSummary]) -> Result<(), StoreError> {
    let csv_error = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(SUMMARY_HEADER).map_err(csv_error)?;
    for summary in summaries {
        let count = summary.bug_count.to_string();
        let ids = summary.issue_ids.join(",");
        writer
            .write_record([summary.project_id.as_str(), count.as_str(), ids.as_str()])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
