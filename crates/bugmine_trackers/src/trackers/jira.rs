//! JIRA XML search-request adapter.

use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::tracker::{PageError, Tracker, TrackerQuery, parse_url_with_params};

const DEFAULT_URI: &str = "https://issues.apache.org/jira/";
const DEFAULT_QUERY: &str = "issuetype = Bug ORDER BY key DESC";
const DEFAULT_LIMIT: usize = 200;

static_regex!(KEY_LINE, r"(?m)^\s*<key[^>]*>(.*?)</key>");

/// Pages through a JIRA instance's XML search view.
#[derive(Debug)]
pub struct JiraTracker;

impl Tracker for JiraTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Jira
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
        let endpoint = format!(
            "{}sr/jira.issueviews:searchrequest-xml/temp/SearchRequest.xml",
            query.base_uri
        );
        let jql = format!("project = \"{}\" AND {}", query.project, query.query);
        let limit = query.limit.to_string();
        let start = start.to_string();

        let url = parse_url_with_params(
            &endpoint,
            [
                ("jqlQuery", jql.as_str()),
                ("tempMax", limit.as_str()),
                ("pager/start", start.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    fn parse_page(&self, body: &str, query: &TrackerQuery) -> Result<Vec<IssueRecord>, PageError> {
        Ok(KEY_LINE
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .map(|key| {
                let key = key.as_str().trim();
                IssueRecord::new(key, format!("{}browse/{key}", query.base_uri))
            })
            .collect())
    }
}
