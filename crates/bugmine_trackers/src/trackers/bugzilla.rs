//! Bugzilla adapter.
//!
//! Bugzilla is fetched in two steps: one HTML buglist query yields the ids
//! of every matching bug, then the ids are requested in chunks through the
//! XML `show_bug.cgi` view. [`Tracker::page_url`] addresses the buglist and
//! [`Tracker::parse_page`] reads an XML chunk.

use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::tracker::{PageError, Tracker, TrackerQuery, parse_url, parse_url_with_params};

const DEFAULT_URI: &str = "https://bz.apache.org/bugzilla/";
const DEFAULT_QUERY: &str = "bug_status=RESOLVED&resolution=FIXED";
const DEFAULT_CHUNK: usize = 50;

static_regex!(BUG_ID_LINE, r"(?m)^\s*<bug_id>(.*?)</bug_id>");
static_regex!(INPUT_TAG, r"(?is)<input\b[^>]*>");
static_regex!(ATTRIBUTE, r#"(?is)([a-z_-]+)\s*=\s*"([^"]*)""#);

/// Lists bugs through `buglist.cgi` and reads them through `show_bug.cgi`.
#[derive(Debug)]
pub struct BugzillaTracker;

impl BugzillaTracker {
    /// Extracts the comma-separated id list Bugzilla embeds in the hidden
    /// input of the `bz_query_buttons` span on a buglist page.
    ///
    /// Returns an empty list when the page has no such input.
    #[must_use]
    pub fn parse_id_list(html: &str) -> Vec<String> {
        let Some(body_at) = html.find("id=\"bugzilla-body\"") else {
            return Vec::new();
        };
        let body = &html[body_at..];
        let Some(span_at) = body.find("bz_query_buttons") else {
            return Vec::new();
        };
        let span = &body[span_at..];
        let span = span.find("</span>").map_or(span, |end| &span[..end]);

        INPUT_TAG
            .find_iter(span)
            .find_map(|tag| {
                let mut hidden = false;
                let mut value = None;
                for attr in ATTRIBUTE.captures_iter(tag.as_str()) {
                    match attr[1].to_ascii_lowercase().as_str() {
                        "type" => hidden = attr[2].eq_ignore_ascii_case("hidden"),
                        "value" => value = Some(attr[2].to_string()),
                        _ => {}
                    }
                }
                value.filter(|_| hidden)
            })
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Builds the XML detail URL for a chunk of bug ids.
    pub fn detail_url(query: &TrackerQuery, ids: &[String]) -> Result<String, PageError> {
        let endpoint = format!("{}show_bug.cgi", query.base_uri);
        let mut url = parse_url(&endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ctype", "xml");
            for id in ids {
                pairs.append_pair("id", id);
            }
        }
        Ok(url.into())
    }
}

impl Tracker for BugzillaTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Bugzilla
    }

    fn default_uri(&self) -> &'static str {
        DEFAULT_URI
    }

    fn default_query(&self) -> &'static str {
        DEFAULT_QUERY
    }

    fn default_limit(&self) -> usize {
        DEFAULT_CHUNK
    }

    fn page_url(&self, query: &TrackerQuery, _start: usize) -> Result<String, PageError> {
        let endpoint = format!("{}buglist.cgi", query.base_uri);
        let filters = query.query.split('&').filter_map(|pair| pair.split_once('='));
        let fixed = [
            ("order", "bug_id"),
            ("limit", "0"),
            ("product", query.project.as_str()),
            ("query_format", "advanced"),
        ];

        let url = parse_url_with_params(&endpoint, filters.chain(fixed))?;
        Ok(url.into())
    }

    fn parse_page(&self, body: &str, query: &TrackerQuery) -> Result<Vec<IssueRecord>, PageError> {
        Ok(BUG_ID_LINE
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .map(|id| {
                let id = id.as_str().trim();
                IssueRecord::new(id, format!("{}show_bug.cgi?id={id}", query.base_uri))
            })
            .collect())
    }
}
