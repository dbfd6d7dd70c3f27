//! Blocking bridge from the pipeline to the async tracker client.

use std::path::Path;

use anyhow::Context as _;
use bugmine_core::Settings;
use bugmine_trackers::{IssueRecord, TrackerClient, TrackerError, TrackerQuery};

use super::{IssueSource, ReportSource};

/// Tracker client plus the single-threaded runtime that drives it.
///
/// Each worker owns one, so requests of different projects never wait on
/// each other's runtime.
#[derive(Debug)]
pub struct HttpTrackers {
    client: TrackerClient,
    runtime: tokio::runtime::Runtime,
}

impl HttpTrackers {
    /// Builds a client with the configured timeout and GitHub token.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = TrackerClient::new(settings.http_timeout())?.with_github_token(settings.github_token.clone());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to create async runtime")?;

        Ok(Self { client, runtime })
    }
}

impl IssueSource for HttpTrackers {
    fn fetch_issues(&self, query: &TrackerQuery, pages_dir: &Path) -> Result<Vec<IssueRecord>, TrackerError> {
        self.runtime.block_on(self.client.fetch_issues(query, pages_dir))
    }
}

impl ReportSource for HttpTrackers {
    fn fetch_report(&self, issue_url: &str) -> Result<String, TrackerError> {
        self.runtime.block_on(self.client.fetch_report(issue_url))
    }
}
