//! HTTP client that drives a [`Tracker`] through its pages.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::USER_AGENT;
use crate::issue::IssueRecord;
use crate::kind::TrackerKind;
use crate::report::report_source_url;
use crate::tracker::{PageError, TrackerQuery, tracker_for};
use crate::trackers::BugzillaTracker;

const MAX_ATTEMPTS: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Errors raised while downloading tracker pages or reports.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The HTTP client could not be initialised.
    #[error("failed to initialize HTTP client: {0}")]
    ClientInit(String),

    /// An HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("GET {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// A page URL could not be built.
    #[error(transparent)]
    Page(#[from] PageError),

    /// A cached page could not be read or written.
    #[error("page cache error at {}: {source}", path.display())]
    Cache {
        /// Cache file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Downloads issue lists and single reports from issue trackers.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: reqwest::Client,
    github_token: Option<String>,
}

impl TrackerClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TrackerError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            github_token: None,
        })
    }

    /// Sets the token sent as `Authorization: token <t>` to the GitHub API.
    #[must_use]
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Fetches every issue matching `query`.
    ///
    /// Raw pages are cached under `pages_dir` and reused on later calls when
    /// non-empty. Pagination stops at the first page that yields no issues or
    /// cannot be parsed.
    pub async fn fetch_issues(&self, query: &TrackerQuery, pages_dir: &Path) -> Result<Vec<IssueRecord>, TrackerError> {
        tokio::fs::create_dir_all(pages_dir)
            .await
            .map_err(|source| TrackerError::Cache {
                path: pages_dir.to_path_buf(),
                source,
            })?;

        if query.kind == TrackerKind::Bugzilla {
            return self.fetch_bugzilla(query, pages_dir).await;
        }

        let tracker = tracker_for(query.kind);
        let authorize = query.kind == TrackerKind::Github;
        let stem = query.file_stem();
        let mut records = Vec::new();
        let mut start = 0;

        loop {
            let url = tracker.page_url(query, start)?;
            let page_path = pages_dir.join(format!("{stem}-issues-{start}.json"));

            let body = match self.cached_or_download(&url, &page_path, authorize).await {
                Ok(body) => body,
                Err(_) if tracker.stops_on_missing_page() && !records.is_empty() => {
                    #[cfg(feature = "tracing")]
                    debug!(%url, "page unavailable, keeping issues found so far");
                    break;
                }
                Err(e) => return Err(e),
            };

            let page = tracker.parse_page(&body, query).unwrap_or_default();
            if page.is_empty() {
                break;
            }

            records.extend(page);
            start += query.limit;
        }

        Ok(records)
    }

    /// Downloads the machine-readable report behind an issue URL.
    pub async fn fetch_report(&self, issue_url: &str) -> Result<String, TrackerError> {
        let url = report_source_url(issue_url);
        let authorize = url.contains("api.github.com");
        self.get_text(&url, authorize).await
    }

    async fn fetch_bugzilla(&self, query: &TrackerQuery, pages_dir: &Path) -> Result<Vec<IssueRecord>, TrackerError> {
        let tracker = tracker_for(TrackerKind::Bugzilla);
        let list_url = tracker.page_url(query, 0)?;
        let html = self.get_text(&list_url, false).await?;
        let ids = BugzillaTracker::parse_id_list(&html);

        let stem = query.file_stem();
        let mut records = Vec::new();
        for (index, chunk) in ids.chunks(query.limit).enumerate() {
            let url = BugzillaTracker::detail_url(query, chunk)?;
            let chunk_path = pages_dir.join(format!("{stem}-issues-xml-{}.txt", index * query.limit));

            // A missing chunk only loses its own ids.
            let body = match self.cached_or_download(&url, &chunk_path, false).await {
                Ok(body) => body,
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(chunk = index, %error, "skipping bugzilla detail chunk");
                    #[cfg(not(feature = "tracing"))]
                    let _ = error;
                    continue;
                }
            };
            records.extend(tracker.parse_page(&body, query).unwrap_or_default());
        }

        Ok(records)
    }

    async fn cached_or_download(&self, url: &str, path: &Path, authorize: bool) -> Result<String, TrackerError> {
        if let Ok(body) = tokio::fs::read_to_string(path).await
            && !body.is_empty()
        {
            #[cfg(feature = "tracing")]
            debug!(page = %path.display(), "reusing cached page");
            return Ok(body);
        }

        #[cfg(feature = "tracing")]
        debug!(%url, "downloading page");
        let body = self.get_text(url, authorize).await?;
        tokio::fs::write(path, &body)
            .await
            .map_err(|source| TrackerError::Cache {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(body)
    }

    async fn get_text(&self, url: &str, authorize: bool) -> Result<String, TrackerError> {
        let mut attempt = 1;
        loop {
            match self.send(url, authorize).await {
                Err(TrackerError::Http(e)) if (e.is_connect() || e.is_timeout()) && attempt < MAX_ATTEMPTS => {
                    #[cfg(feature = "tracing")]
                    warn!(%url, attempt, error = %e, "request failed, retrying");
                    #[cfg(not(feature = "tracing"))]
                    let _ = e;
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send(&self, url: &str, authorize: bool) -> Result<String, TrackerError> {
        let mut request = self.client.get(url);
        if authorize && let Some(token) = &self.github_token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
