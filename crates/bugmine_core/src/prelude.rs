//! Convenience re-exports of the most commonly used types.

pub use crate::error::{MineError, PatternError};
pub use crate::log::{CommitEntry, CommitStream};
pub use crate::manifest::{Manifest, ProjectDescriptor};
pub use crate::matcher::{Ancestry, BugPattern, CrossReferencer, MatchOutcome, ParentResolver, PatternOptions};
pub use crate::record::{BugRecord, NOT_AVAILABLE};
pub use crate::registry::IssueRegistry;
pub use crate::settings::Settings;
pub use crate::store::{BugRegistry, BugRow};
pub use crate::url::{commit_url, compare_url};
