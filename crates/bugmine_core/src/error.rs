use thiserror::Error;

/// Errors that can occur when compiling a bug-fix pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern's regular expression failed to compile.
    #[error("invalid bug-fix pattern '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern text as written in the manifest.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The pattern compiled but has no group to capture the issue id.
    #[error("bug-fix pattern '{pattern}' has no capturing group")]
    MissingCaptureGroup {
        /// The pattern text as written in the manifest.
        pattern: String,
    },
}

/// Top-level error type for the mining engine.
///
/// Unifies errors from pattern compilation, issue lists, the bug registry,
/// manifests, and settings for callers that orchestrate a full run.
#[derive(Debug, Error)]
pub enum MineError {
    /// A bug-fix pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// An issue list could not be loaded.
    #[error(transparent)]
    Registry(#[from] crate::registry::RegistryError),

    /// The bug registry CSV could not be read or written.
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    /// A manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),

    /// Settings could not be read or parsed.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// The commit log could not be read.
    #[error("failed to read commit log: {0}")]
    Log(#[from] std::io::Error),
}
