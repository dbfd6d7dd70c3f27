//! Per-file locks for caches shared between concurrently mined projects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Hands out one mutex per cache file.
///
/// Two projects that share an issue tracker project share one
/// `issues.txt`; holding its lock across the existence check and the
/// download makes the second project wait and then reuse the first
/// project's file.
#[derive(Debug, Default)]
pub struct CacheLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl CacheLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding `path`, creating it on first use.
    #[must_use]
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }
}
