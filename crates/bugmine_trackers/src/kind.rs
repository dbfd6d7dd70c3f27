//! The closed set of supported issue trackers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unsupported tracker name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTrackerKindError {
    invalid_value: Box<str>,
}

impl ParseTrackerKindError {
    fn new(value: &str) -> Self {
        Self {
            invalid_value: value.into(),
        }
    }

    /// Returns the tracker name that failed to parse.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParseTrackerKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected: Vec<&str> = TrackerKind::ALL.iter().map(|k| k.as_str()).collect();
        write!(
            f,
            "invalid tracker name '{}': expected one of {}",
            self.invalid_value,
            expected.join(", ")
        )
    }
}

impl std::error::Error for ParseTrackerKindError {}

/// Supported issue tracker families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    /// The Google Code archive on Google Cloud Storage.
    Google,
    /// Atlassian JIRA (defaults to the Apache instance).
    Jira,
    /// GitHub issues via the REST API.
    Github,
    /// SourceForge tickets via the REST API.
    Sourceforge,
    /// Bugzilla (defaults to the Apache instance).
    Bugzilla,
}

impl TrackerKind {
    /// Every supported tracker kind.
    pub const ALL: [Self; 5] = [Self::Google, Self::Jira, Self::Github, Self::Sourceforge, Self::Bugzilla];

    /// Returns the canonical lowercase name used in manifests and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Jira => "jira",
            Self::Github => "github",
            Self::Sourceforge => "sourceforge",
            Self::Bugzilla => "bugzilla",
        }
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackerKind {
    type Err = ParseTrackerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "jira" => Ok(Self::Jira),
            "github" => Ok(Self::Github),
            "sourceforge" => Ok(Self::Sourceforge),
            "bugzilla" => Ok(Self::Bugzilla),
            _ => Err(ParseTrackerKindError::new(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_canonical_name() {
        for kind in TrackerKind::ALL {
            assert_eq!(kind.as_str().parse::<TrackerKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parsing_ignores_case_and_surrounding_space() {
        assert_eq!(" JIRA ".parse::<TrackerKind>().unwrap(), TrackerKind::Jira);
        assert_eq!("GitHub".parse::<TrackerKind>().unwrap(), TrackerKind::Github);
    }

    #[test]
    fn unknown_name_reports_value_and_choices() {
        let err = "redmine".parse::<TrackerKind>().unwrap_err();
        assert_eq!(err.invalid_value(), "redmine");
        let message = err.to_string();
        assert!(message.contains("redmine"));
        assert!(message.contains("bugzilla"));
    }
}
