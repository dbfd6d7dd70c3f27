//! GitHub REST issues adapter.

use serde::Deserialize;

use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::tracker::{PageError, Tracker, TrackerQuery, parse_url};

const DEFAULT_URI: &str = "https://api.github.com/repos/";
const DEFAULT_QUERY: &str = "";
const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct Issue {
    number: u64,
    html_url: String,
}

/// Pages through `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug)]
pub struct GithubTracker;

impl GithubTracker {
    fn repository(query: &TrackerQuery) -> String {
        match &query.organization {
            Some(org) if !query.project.contains('/') => format!("{org}/{}", query.project),
            _ => query.project.clone(),
        }
    }
}

impl Tracker for GithubTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Github
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
        let endpoint = format!("{}{}/issues", query.base_uri, Self::repository(query));
        let mut url = parse_url(&endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("state", "all");
            for (key, value) in query
                .query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
            {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("per_page", &query.limit.to_string());
            pairs.append_pair("page", &(start / query.limit + 1).to_string());
        }
        Ok(url.into())
    }

    fn parse_page(&self, body: &str, _query: &TrackerQuery) -> Result<Vec<IssueRecord>, PageError> {
        let issues: Vec<Issue> = serde_json::from_str(body)?;
        Ok(issues
            .into_iter()
            .map(|issue| IssueRecord::new(issue.number.to_string(), issue.html_url))
            .collect())
    }
}
