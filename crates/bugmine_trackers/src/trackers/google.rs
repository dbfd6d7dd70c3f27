//! Google Code archive adapter.
//!
//! The archive is frozen, so each project has a fixed set of
//! `issues-page-<n>.json` documents and a missing page marks the end.

use serde::Deserialize;

use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::tracker::{PageError, Tracker, TrackerQuery};

const DEFAULT_URI: &str = "https://storage.googleapis.com/google-code-archive/v2/code.google.com/";
const DEFAULT_QUERY: &str = "label:type-defect";
const DEFAULT_LIMIT: usize = 1;
const DEFECT_LABEL: &str = "Type-Defect";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    id: u64,
    #[serde(default)]
    labels: Vec<String>,
}

/// Reads archived Google Code issue pages, keeping defects only.
#[derive(Debug)]
pub struct GoogleTracker;

impl Tracker for GoogleTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Google
    }

    fn default_uri(&self) -> &'static str {
        DEFAULT_URI
    }

    fn default_query(&self) -> &'static str {
        DEFAULT_QUERY
    }

    fn default_limit(&self) -> usize {
        DEFAULT_LIMIT
    }

    fn page_url(&self, query: &TrackerQuery, start: usize) -> Result<String, PageError> {
        let url = crate::tracker::parse_url(&query.base_uri)?;
        let page = url
            .join(&format!("{}/issues-page-{}.json", query.project, start + 1))
            .map_err(|e| PageError::InvalidUrl {
                url: query.base_uri.clone(),
                reason: e.to_string(),
            })?;
        Ok(page.into())
    }

    fn parse_page(&self, body: &str, query: &TrackerQuery) -> Result<Vec<IssueRecord>, PageError> {
        let page: Page = serde_json::from_str(body)?;
        Ok(page
            .issues
            .into_iter()
            .filter(|issue| issue.labels.iter().any(|label| label.starts_with(DEFECT_LABEL)))
            .map(|issue| {
                IssueRecord::new(
                    issue.id.to_string(),
                    format!("{}{}/issues/issue-{}.json", query.base_uri, query.project, issue.id),
                )
            })
            .collect())
    }

    fn stops_on_missing_page(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_is_one_based() {
        let query = TrackerQuery::new(TrackerKind::Google, "mockito");
        assert_eq!(
            GoogleTracker.page_url(&query, 0).unwrap(),
            "https://storage.googleapis.com/google-code-archive/v2/code.google.com/mockito/issues-page-1.json"
        );
        assert!(GoogleTracker.page_url(&query, 3).unwrap().ends_with("/issues-page-4.json"));
    }

    #[test]
    fn parse_page_keeps_only_defects() {
        let body = r#"{"issues": [
            {"id": 1, "labels": ["Type-Defect", "Priority-Medium"]},
            {"id": 2, "labels": ["Type-Enhancement"]},
            {"id": 3, "labels": ["Type-Defect-Regression"]},
            {"id": 4}
        ]}"#;
        let query = TrackerQuery::new(TrackerKind::Google, "mockito");
        let records = GoogleTracker.parse_page(body, &query).unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(
            records[0].url,
            "https://storage.googleapis.com/google-code-archive/v2/code.google.com/mockito/issues/issue-1.json"
        );
    }

    #[test]
    fn stops_pagination_on_missing_page() {
        assert!(GoogleTracker.stops_on_missing_page());
    }
}
