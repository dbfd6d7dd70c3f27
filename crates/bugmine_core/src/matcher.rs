//! Bug-fix pattern matching and commit cross-referencing.

use std::fmt::Display;
use std::io;

use regex::{Regex, RegexBuilder};
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::error::PatternError;
use crate::log::CommitEntry;
use crate::record::BugRecord;
use crate::registry::IssueRegistry;
use crate::url::{commit_url, compare_url};

/// Regex flags applied to every bug-fix pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternOptions {
    /// Match letters regardless of case.
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries.
    pub multi_line: bool,
}

/// A compiled bug-fix pattern whose first group captures the issue token.
#[derive(Debug, Clone)]
pub struct BugPattern {
    regex: Regex,
}

impl BugPattern {
    /// Compiles `pattern` with `options`.
    ///
    /// Fails if the regex is invalid or has no capturing group.
    pub fn new(pattern: &str, options: PatternOptions) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.case_insensitive)
            .multi_line(options.multi_line)
            .build()
            .map_err(|source| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;

        if regex.captures_len() < 2 {
            return Err(PatternError::MissingCaptureGroup {
                pattern: pattern.to_string(),
            });
        }
        Ok(Self { regex })
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the text of the first capturing group of the first match.
    #[must_use]
    pub fn capture<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        self.regex.captures(haystack)?.get(1).map(|m| m.as_str())
    }
}

/// Looks up the parents of a commit.
pub trait ParentResolver {
    /// Error raised when the lookup itself fails.
    type Error: Display;

    /// Returns the parent hashes of `commit` in order. A root commit has none.
    fn parents(&self, commit: &str) -> Result<Vec<String>, Self::Error>;
}

/// Why a matched commit was excluded for its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ancestry {
    /// The commit has no parent.
    Root,
    /// The commit has more than one parent.
    Merge {
        /// All parent hashes.
        parents: Vec<String>,
    },
}

/// Result of examining one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The commit fixes a registered issue and has exactly one parent.
    Matched(BugRecord),
    /// The message did not match, or the capturing group did not take part.
    NoPatternMatch,
    /// The captured token is not in the issue registry.
    UnknownIssueToken(String),
    /// The commit is a root or a merge.
    ExcludedAncestry(Ancestry),
    /// The parent lookup failed.
    ParentUnavailable,
}

/// Counts of each outcome over a cross-referencing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XrefTally {
    /// Commits examined.
    pub examined: usize,
    /// Commits that produced a record.
    pub matched: usize,
    /// Commits whose message did not match.
    pub no_pattern_match: usize,
    /// Commits referencing an unknown issue.
    pub unknown_issue: usize,
    /// Root commits skipped.
    pub root: usize,
    /// Merge commits skipped.
    pub merge: usize,
    /// Commits whose parents could not be resolved.
    pub parent_unavailable: usize,
}

impl XrefTally {
    fn record(&mut self, outcome: &MatchOutcome) {
        self.examined += 1;
        match outcome {
            MatchOutcome::Matched(_) => self.matched += 1,
            MatchOutcome::NoPatternMatch => self.no_pattern_match += 1,
            MatchOutcome::UnknownIssueToken(_) => self.unknown_issue += 1,
            MatchOutcome::ExcludedAncestry(Ancestry::Root) => self.root += 1,
            MatchOutcome::ExcludedAncestry(Ancestry::Merge { .. }) => self.merge += 1,
            MatchOutcome::ParentUnavailable => self.parent_unavailable += 1,
        }
    }
}

/// Records produced by a full pass together with the outcome counts.
#[derive(Debug, Clone, Default)]
pub struct XrefReport {
    /// Emitted records in discovery order.
    pub records: Vec<BugRecord>,
    /// Outcome counts.
    pub tally: XrefTally,
}

/// Matches commits against a pattern and an issue registry.
///
/// Each emitted record gets the next version id, starting at 1. Ids are
/// consumed only by emitted records.
#[derive(Debug)]
pub struct CrossReferencer<'a, P> {
    pattern: &'a BugPattern,
    registry: &'a IssueRegistry,
    resolver: &'a P,
    project_id: String,
    repository_url: String,
    next_version_id: u64,
}

impl<'a, P: ParentResolver> CrossReferencer<'a, P> {
    /// Creates a cross-referencer for one project.
    pub fn new(
        pattern: &'a BugPattern,
        registry: &'a IssueRegistry,
        resolver: &'a P,
        project_id: impl Into<String>,
        repository_url: impl Into<String>,
    ) -> Self {
        Self {
            pattern,
            registry,
            resolver,
            project_id: project_id.into(),
            repository_url: repository_url.into(),
            next_version_id: 1,
        }
    }

    /// Numbers emitted records from `first` instead of 1, for appending to
    /// a registry that already holds rows.
    #[must_use]
    pub fn with_first_version_id(mut self, first: u64) -> Self {
        self.next_version_id = first.max(1);
        self
    }

    /// Examines one commit.
    pub fn examine(&mut self, entry: &CommitEntry) -> MatchOutcome {
        let message = entry.message_text();
        let Some(token) = self.pattern.capture(&message) else {
            return MatchOutcome::NoPatternMatch;
        };
        let Some(issue_url) = self.registry.get(token) else {
            return MatchOutcome::UnknownIssueToken(token.to_string());
        };

        let mut parents = match self.resolver.parents(&entry.hash) {
            Ok(parents) => parents,
            Err(error) => {
                #[cfg(feature = "tracing")]
                warn!(commit = %entry.hash, %error, "could not resolve parents");
                #[cfg(not(feature = "tracing"))]
                let _ = error;
                return MatchOutcome::ParentUnavailable;
            }
        };

        let buggy_commit = match parents.len() {
            0 => return MatchOutcome::ExcludedAncestry(Ancestry::Root),
            1 => parents.remove(0),
            _ => return MatchOutcome::ExcludedAncestry(Ancestry::Merge { parents }),
        };

        let version_id = self.next_version_id;
        self.next_version_id += 1;

        MatchOutcome::Matched(BugRecord {
            version_id,
            project_id: self.project_id.clone(),
            buggy_commit_url: commit_url(&self.repository_url, &buggy_commit),
            fixed_commit_url: commit_url(&self.repository_url, &entry.hash),
            compare_url: compare_url(&self.repository_url, &buggy_commit, &entry.hash),
            buggy_commit,
            fixed_commit: entry.hash.clone(),
            issue_id: token.to_string(),
            issue_url: issue_url.to_string(),
        })
    }

    /// Examines every commit of a stream, stopping at the first read error.
    pub fn run<I>(&mut self, entries: I) -> io::Result<XrefReport>
    where
        I: IntoIterator<Item = io::Result<CommitEntry>>,
    {
        let mut report = XrefReport::default();
        for entry in entries {
            let outcome = self.examine(&entry?);
            report.tally.record(&outcome);
            if let MatchOutcome::Matched(record) = outcome {
                #[cfg(feature = "tracing")]
                debug!(bug_id = record.version_id, issue = %record.issue_id, commit = %record.fixed_commit, "bug-fixing commit");
                report.records.push(record);
            }
        }

        #[cfg(feature = "tracing")]
        if report.records.is_empty() {
            warn!(examined = report.tally.examined, "no commit matched the bug-fix pattern");
        }

        Ok(report)
    }
}
