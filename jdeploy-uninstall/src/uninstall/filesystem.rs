//! Filesystem removal primitives. None of them follow symbolic links.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use crate::manifest::CleanupStrategy;

/// What happened to a removal target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// Nothing existed at the path.
    Missing,
    /// Kept on purpose, e.g. a non-empty `ifEmpty` directory.
    Preserved,
    /// Children removed, the directory itself kept.
    Emptied,
}

fn metadata(path: &Path) -> io::Result<Option<Metadata>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove whatever is at `path`. Links are unlinked, directories removed
/// recursively.
fn remove_entry(path: &Path, meta: &Metadata) -> io::Result<()> {
    if meta.file_type().is_symlink() {
        // Directory symlinks on Windows need remove_dir.
        fs::remove_file(path).or_else(|e| fs::remove_dir(path).map_err(|_| e))
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Remove a recorded file, link, or anything else at that path.
pub fn remove_path(path: &Path) -> io::Result<Removal> {
    match metadata(path)? {
        None => Ok(Removal::Missing),
        Some(meta) => {
            remove_entry(path, &meta)?;
            Ok(Removal::Removed)
        }
    }
}

/// Apply a directory cleanup strategy.
///
/// A symlink in place of the directory only has the link removed. A regular
/// file is removed under `always` and kept otherwise.
pub fn cleanup_directory(path: &Path, strategy: CleanupStrategy) -> io::Result<Removal> {
    let meta = match metadata(path)? {
        None => return Ok(Removal::Missing),
        Some(meta) => meta,
    };

    if meta.file_type().is_symlink() {
        remove_entry(path, &meta)?;
        return Ok(Removal::Removed);
    }

    if !meta.is_dir() {
        return match strategy {
            CleanupStrategy::Always => {
                fs::remove_file(path)?;
                Ok(Removal::Removed)
            }
            _ => Ok(Removal::Preserved),
        };
    }

    match strategy {
        CleanupStrategy::Always => {
            fs::remove_dir_all(path)?;
            Ok(Removal::Removed)
        }
        CleanupStrategy::IfEmpty => {
            if fs::read_dir(path)?.next().is_none() {
                fs::remove_dir(path)?;
                Ok(Removal::Removed)
            } else {
                Ok(Removal::Preserved)
            }
        }
        CleanupStrategy::ContentsOnly => {
            for entry in fs::read_dir(path)? {
                let child = entry?.path();
                if let Some(meta) = metadata(&child)? {
                    remove_entry(&child, &meta)?;
                }
            }
            Ok(Removal::Emptied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_missing_path() {
        let temp = TempDir::new().unwrap();
        assert_eq!(remove_path(&temp.path().join("nope")).unwrap(), Removal::Missing);
    }

    #[test]
    fn test_remove_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        assert_eq!(remove_path(&file).unwrap(), Removal::Removed);
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_link_keeps_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "x").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(remove_path(&link).unwrap(), Removal::Removed);
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_dangling_link() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("dangling");
        std::os::unix::fs::symlink(temp.path().join("gone"), &link).unwrap();
        assert!(!link.exists());

        assert_eq!(remove_path(&link).unwrap(), Removal::Removed);
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[test]
    fn test_if_empty_preserves_non_empty() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("user.txt"), "x").unwrap();

        assert_eq!(
            cleanup_directory(&dir, CleanupStrategy::IfEmpty).unwrap(),
            Removal::Preserved
        );
        assert!(dir.join("user.txt").exists());
    }

    #[test]
    fn test_if_empty_removes_empty() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir(&dir).unwrap();
        assert_eq!(
            cleanup_directory(&dir, CleanupStrategy::IfEmpty).unwrap(),
            Removal::Removed
        );
        assert!(!dir.exists());
    }

    #[test]
    fn test_always_removes_tree() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir_all(dir.join("a/b")).unwrap();
        fs::write(dir.join("a/b/c.txt"), "x").unwrap();
        assert_eq!(
            cleanup_directory(&dir, CleanupStrategy::Always).unwrap(),
            Removal::Removed
        );
        assert!(!dir.exists());
    }

    #[test]
    fn test_contents_only_keeps_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("f.txt"), "x").unwrap();
        fs::write(dir.join("sub/g.txt"), "x").unwrap();

        assert_eq!(
            cleanup_directory(&dir, CleanupStrategy::ContentsOnly).unwrap(),
            Removal::Emptied
        );
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            cleanup_directory(&temp.path().join("x"), CleanupStrategy::Always).unwrap(),
            Removal::Missing
        );
    }
}
