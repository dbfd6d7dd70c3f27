//! Builtin tracker adapters.

/// Declares a lazily compiled static regex.
macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        #[expect(clippy::expect_used, reason = "static regex literal; failure is a programmer error")]
        static $name: std::sync::LazyLock<regex::Regex> =
            std::sync::LazyLock::new(|| regex::Regex::new($pattern).expect("invalid static regex"));
    };
}

mod bugzilla;
mod github;
mod google;
mod jira;
mod sourceforge;

pub use bugzilla::BugzillaTracker;
pub use github::GithubTracker;
pub use google::GoogleTracker;
pub use jira::JiraTracker;
pub use sourceforge::SourceforgeTracker;
