use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes `content` to `path` atomically by writing to a uniquely named
/// temporary file in the same directory, syncing to disk, then renaming
/// into place.
///
/// Concurrent readers see either the old file or the complete new one.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;

    // Ensure data is persisted to disk before rename
    file.as_file().sync_all()?;

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Returns `true` when `path` is a regular file with at least one byte.
#[must_use]
pub fn is_nonempty_file(path: &Path) -> bool {
    path.metadata().is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// Returns `true` when `path` is a directory with at least one entry.
#[must_use]
pub fn is_nonempty_dir(path: &Path) -> bool {
    path.read_dir().is_ok_and(|mut entries| entries.next().is_some())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn atomic_write_creates_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("issues.txt");

        atomic_write(&path, "A-1,http://x/1\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "A-1,http://x/1\n");
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("issues.txt");
        fs::write(&path, "old content").unwrap();

        atomic_write(&path, "new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn atomic_write_does_not_leave_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("issues.txt");

        atomic_write(&path, "content").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn nonempty_file_check() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty");
        let full = dir.path().join("full");
        fs::write(&empty, "").unwrap();
        fs::write(&full, "x").unwrap();

        assert!(!is_nonempty_file(&empty));
        assert!(is_nonempty_file(&full));
        assert!(!is_nonempty_file(&dir.path().join("missing")));
        assert!(!is_nonempty_file(dir.path()));
    }

    #[test]
    fn nonempty_dir_check() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.git");
        let full = dir.path().join("full.git");
        fs::create_dir(&empty).unwrap();
        fs::create_dir(&full).unwrap();
        fs::write(full.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        assert!(!is_nonempty_dir(&empty));
        assert!(is_nonempty_dir(&full));
        assert!(!is_nonempty_dir(&dir.path().join("missing")));
        assert!(!is_nonempty_dir(&full.join("HEAD")));
    }
}
