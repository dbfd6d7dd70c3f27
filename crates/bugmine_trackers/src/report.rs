//! Where and in what format a single issue's report is downloaded.

use std::fmt;

/// Storage format of a downloaded issue report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JIRA and Bugzilla XML views.
    Xml,
    /// Everything else.
    Json,
}

impl ReportFormat {
    /// File extension used for report artifacts of this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returns the format a report at `url` is stored in.
#[must_use]
pub fn report_format(url: &str) -> ReportFormat {
    if url.contains("/jira/") || url.contains("/bugzilla/") || url.contains("show_bug.cgi") {
        ReportFormat::Xml
    } else {
        ReportFormat::Json
    }
}

/// Maps an issue's browse URL to the URL its machine-readable report is
/// downloaded from.
///
/// JIRA browse pages map to the issue XML view, Bugzilla pages gain
/// `ctype=xml`, and GitHub issue pages map to the REST API. Anything else
/// is returned unchanged.
#[must_use]
pub fn report_source_url(url: &str) -> String {
    if let Some((base, key)) = url.split_once("/browse/") {
        let key = key.trim_end_matches('/');
        return format!("{base}/si/jira.issueviews:issue-xml/{key}/{key}.xml");
    }

    if url.contains("show_bug.cgi?") {
        if url.contains("ctype=xml") {
            return url.to_string();
        }
        return url.replacen("show_bug.cgi?", "show_bug.cgi?ctype=xml&", 1);
    }

    for prefix in ["https://github.com/", "http://github.com/"] {
        if let Some(path) = url.strip_prefix(prefix)
            && path.split('/').nth(2) == Some("issues")
        {
            return format!("https://api.github.com/repos/{path}");
        }
    }

    url.to_string()
}
