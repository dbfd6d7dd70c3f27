//! Browse and compare URLs for hosted repositories.
//!
//! Both functions are total: any input they cannot map yields
//! [`NOT_AVAILABLE`].

use crate::record::NOT_AVAILABLE;

const APACHE_MIRROR: &str = "gitbox.apache.org/repos/asf";
const APACHE_GITHUB: &str = "github.com/apache";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Host {
    Github,
    Gitlab,
    Bitbucket,
}

fn resolve(repository_url: &str) -> Option<(Host, String)> {
    let trimmed = repository_url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let base = trimmed.trim_end_matches('/').replace(APACHE_MIRROR, APACHE_GITHUB);

    let host = if base.contains("github.com") {
        Host::Github
    } else if base.contains("gitlab.com") {
        Host::Gitlab
    } else if base.contains("bitbucket.org") {
        Host::Bitbucket
    } else {
        return None;
    };
    Some((host, base))
}

/// Returns the browse URL of `hash` in `repository_url`.
#[must_use]
pub fn commit_url(repository_url: &str, hash: &str) -> String {
    if hash.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    match resolve(repository_url) {
        Some((Host::Github | Host::Bitbucket, base)) => format!("{base}/tree/{hash}"),
        Some((Host::Gitlab, base)) => format!("{base}/-/tree/{hash}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Returns the URL comparing `buggy` with `fixed` in `repository_url`.
///
/// Bitbucket lists the newer revision first.
#[must_use]
pub fn compare_url(repository_url: &str, buggy: &str, fixed: &str) -> String {
    if buggy.is_empty() || fixed.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    match resolve(repository_url) {
        Some((Host::Github, base)) => format!("{base}/compare/{buggy}...{fixed}"),
        Some((Host::Gitlab, base)) => format!("{base}/-/compare/{buggy}...{fixed}"),
        Some((Host::Bitbucket, base)) => format!("{base}/compare/{fixed}..{buggy}#diff"),
        None => NOT_AVAILABLE.to_string(),
    }
}
