//! SourceForge REST tickets adapter.

use serde::Deserialize;

use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::tracker::{PageError, Tracker, TrackerQuery, parse_url_with_params};

const DEFAULT_URI: &str = "https://sourceforge.net/rest/p/";
const DEFAULT_QUERY: &str = "bugs";
const DEFAULT_LIMIT: usize = 100;
const SITE: &str = "https://sourceforge.net";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    tickets: Vec<Ticket>,
    tracker_config: Option<TrackerConfig>,
}

#[derive(Debug, Deserialize)]
struct Ticket {
    ticket_num: u64,
}

#[derive(Debug, Deserialize)]
struct TrackerConfig {
    options: TrackerOptions,
}

#[derive(Debug, Deserialize)]
struct TrackerOptions {
    url: String,
}

/// Pages through a SourceForge project's ticket tool.
#[derive(Debug)]
pub struct SourceforgeTracker;

impl Tracker for SourceforgeTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Sourceforge
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
        let tool = query.query.trim_matches('/');
        let endpoint = format!("{}{}/{tool}/", query.base_uri, query.project);
        let page = (start / query.limit).to_string();
        let limit = query.limit.to_string();

        let url = parse_url_with_params(&endpoint, [("page", page.as_str()), ("limit", limit.as_str())])?;
        Ok(url.into())
    }

    fn parse_page(&self, body: &str, _query: &TrackerQuery) -> Result<Vec<IssueRecord>, PageError> {
        let page: Page = serde_json::from_str(body)?;
        if page.tickets.is_empty() {
            return Ok(Vec::new());
        }

        let tool_url = page
            .tracker_config
            .map(|config| config.options.url)
            .ok_or(PageError::MissingField("tracker_config.options.url"))?;

        Ok(page
            .tickets
            .into_iter()
            .map(|ticket| {
                IssueRecord::new(
                    ticket.ticket_num.to_string(),
                    format!("{SITE}{tool_url}{}", ticket.ticket_num),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_uses_zero_based_page_index() {
        let query = TrackerQuery::new(TrackerKind::Sourceforge, "jfreechart");
        assert_eq!(
            SourceforgeTracker.page_url(&query, 200).unwrap(),
            "https://sourceforge.net/rest/p/jfreechart/bugs/?page=2&limit=100"
        );
    }

    #[test]
    fn parse_page_builds_urls_from_tool_path() {
        let body = r#"{
            "tickets": [{"ticket_num": 981, "summary": "NPE"}, {"ticket_num": 12}],
            "tracker_config": {"options": {"url": "/p/jfreechart/bugs/"}}
        }"#;
        let query = TrackerQuery::new(TrackerKind::Sourceforge, "jfreechart");
        let records = SourceforgeTracker.parse_page(body, &query).unwrap();

        assert_eq!(
            records,
            vec![
                IssueRecord::new("981", "https://sourceforge.net/p/jfreechart/bugs/981"),
                IssueRecord::new("12", "https://sourceforge.net/p/jfreechart/bugs/12"),
            ]
        );
    }

    #[test]
    fn empty_ticket_list_needs_no_config() {
        let query = TrackerQuery::new(TrackerKind::Sourceforge, "jfreechart");
        let records = SourceforgeTracker.parse_page(r#"{"tickets": []}"#, &query).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn tickets_without_config_are_rejected() {
        let query = TrackerQuery::new(TrackerKind::Sourceforge, "jfreechart");
        let err = SourceforgeTracker
            .parse_page(r#"{"tickets": [{"ticket_num": 1}]}"#, &query)
            .unwrap_err();
        assert!(matches!(err, PageError::MissingField("tracker_config.options.url")));
    }
}
