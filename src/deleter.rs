use std::path::{Path, PathBuf};

use crate::error::BuddyError;
use crate::utils;

/// Outcome of one deletion pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletionResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub bytes_freed: u64,
    /// Paths that could not be removed, with the reason, in input order.
    pub failures: Vec<(PathBuf, String)>,
}

/// Remove a file or a whole directory tree. Returns bytes freed on success.
/// A symlink is removed itself; its target is left alone.
pub fn remove_path(path: &Path) -> Result<u64, BuddyError> {
    let remove_err = |source| BuddyError::Remove {
        path: path.to_path_buf(),
        source,
    };
    let meta = path.symlink_metadata().map_err(remove_err)?;
    let size = utils::entry_size(path);
    if meta.is_dir() {
        std::fs::remove_dir_all(path).map_err(remove_err)?;
    } else {
        std::fs::remove_file(path).map_err(remove_err)?;
    }
    Ok(size)
}

/// Delete every path, carrying on past failures. Irreversible.
pub fn delete(paths: &[PathBuf]) -> DeletionResult {
    let mut result = DeletionResult {
        attempted: paths.len(),
        ..Default::default()
    };

    for path in paths {
        match remove_path(path) {
            Ok(freed) => {
                log::info!("Deleted: {}", path.display());
                result.succeeded += 1;
                result.bytes_freed += freed;
            }
            Err(e) => {
                log::warn!("{e}");
                result.failures.push((path.clone(), e.to_string()));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_input() {
        let result = delete(&[]);
        assert_eq!(result, DeletionResult::default());
        assert_eq!(result.attempted, 0);
        assert_eq!(result.succeeded, 0);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_mixed_file_and_missing_path() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("old.txt");
        let missing = tmp.path().join("missing.txt");
        fs::write(&file, b"12345").unwrap();

        let result = delete(&[file.clone(), missing.clone()]);

        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.bytes_freed, 5);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, missing);
        assert!(result.failures[0].1.starts_with("failed to delete"));
        assert!(!file.exists());
    }

    #[test]
    fn test_failure_does_not_stop_later_paths() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");
        let file = tmp.path().join("after.txt");
        fs::write(&file, b"x").unwrap();

        let result = delete(&[missing, file.clone()]);
        assert_eq!(result.succeeded, 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_directory_removed_recursively() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("cache");
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("a.bin"), [0u8; 3]).unwrap();
        fs::write(dir.join("nested/deeper/b.bin"), [0u8; 4]).unwrap();

        let result = delete(&[dir.clone()]);

        assert_eq!(result.succeeded, 1);
        assert!(result.failures.is_empty());
        assert_eq!(result.bytes_freed, 7);
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_directory_removes_only_the_link() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"keep").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = delete(&[link.clone()]);

        assert_eq!(result.succeeded, 1);
        assert!(link.symlink_metadata().is_err());
        assert!(target.join("keep.txt").exists());
    }
}
