//! The `Tracker` trait and the query it is driven by.

use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::trackers::{BugzillaTracker, GithubTracker, GoogleTracker, JiraTracker, SourceforgeTracker};

/// Errors raised while building a page URL or parsing a page body.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A page URL could not be assembled from the query.
    #[error("invalid tracker URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL (or base URL) that failed to parse.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// The page body was not the JSON document the tracker returns.
    #[error("malformed JSON page: {0}")]
    Json(#[from] serde_json::Error),

    /// The page parsed but lacked a field needed to build issue URLs.
    #[error("page is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Everything needed to address one project on one tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerQuery {
    /// Which tracker family to talk to.
    pub kind: TrackerKind,
    /// The project's identifier on the tracker (e.g. `"LANG"`).
    pub project: String,
    /// Base URI of the tracker instance, always ending in `/`.
    pub base_uri: String,
    /// Tracker-specific filter expression.
    pub query: String,
    /// Page size.
    pub limit: usize,
    /// Owning organisation, used by GitHub when `project` has no owner.
    pub organization: Option<String>,
}

impl TrackerQuery {
    /// Creates a query using the tracker's default URI, filter, and page size.
    #[must_use]
    pub fn new(kind: TrackerKind, project: impl Into<String>) -> Self {
        let tracker = tracker_for(kind);
        Self {
            kind,
            project: project.into(),
            base_uri: tracker.default_uri().to_string(),
            query: tracker.default_query().to_string(),
            limit: tracker.default_limit(),
            organization: None,
        }
    }

    /// Overrides the tracker base URI. A trailing `/` is added if missing.
    #[must_use]
    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        let mut uri = uri.into();
        if !uri.ends_with('/') {
            uri.push('/');
        }
        self.base_uri = uri;
        self
    }

    /// Overrides the tracker filter expression.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Overrides the page size (clamped to at least 1).
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Sets the owning organisation (GitHub only).
    #[must_use]
    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization;
        self
    }

    /// File-name-safe form of the project id, used for cached page names.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.project.replace('/', "-")
    }
}

/// A tracker family: how to page through its issues and read each page.
pub trait Tracker: Send + Sync {
    /// Returns the kind this implementation serves.
    fn kind(&self) -> TrackerKind;

    /// Returns the default base URI of the public instance.
    fn default_uri(&self) -> &'static str;

    /// Returns the default filter expression.
    fn default_query(&self) -> &'static str;

    /// Returns the default page size.
    fn default_limit(&self) -> usize;

    /// Builds the URL of the page starting at issue offset `start`.
    fn page_url(&self, query: &TrackerQuery, start: usize) -> Result<String, PageError>;

    /// Extracts issue records from a downloaded page.
    fn parse_page(&self, body: &str, query: &TrackerQuery) -> Result<Vec<IssueRecord>, PageError>;

    /// When `true`, a failed download after the first non-empty page ends
    /// pagination instead of failing the fetch.
    fn stops_on_missing_page(&self) -> bool {
        false
    }
}

/// Returns the tracker implementation for `kind`.
#[must_use]
pub fn tracker_for(kind: TrackerKind) -> &'static dyn Tracker {
    match kind {
        TrackerKind::Google => &GoogleTracker,
        TrackerKind::Jira => &JiraTracker,
        TrackerKind::Github => &GithubTracker,
        TrackerKind::Sourceforge => &SourceforgeTracker,
        TrackerKind::Bugzilla => &BugzillaTracker,
    }
}

pub(crate) fn parse_url(url: &str) -> Result<reqwest::Url, PageError> {
    reqwest::Url::parse(url).map_err(|e| PageError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn parse_url_with_params<'a, I>(url: &str, params: I) -> Result<reqwest::Url, PageError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    reqwest::Url::parse_with_params(url, params).map_err(|e| PageError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
