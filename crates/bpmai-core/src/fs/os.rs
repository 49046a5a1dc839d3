//! `FileSystem` backed by the host filesystem.
//!
//! Writes are atomic:
//! 1. Write to a temp file next to the target with a PID suffix
//! 2. Sync to disk
//! 3. Rename over the target
//!
//! A target file that exists is always complete; the converter's
//! skip-if-exists rule relies on it.

use super::traits::{DirEntry, FileSystem};
use crate::error::{BpmaiError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn temp_path_for(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.tmp", name, process::id()))
    }
}

impl FileSystem for OsFileSystem {
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        if !dir.is_dir() {
            return Err(if dir.exists() {
                BpmaiError::NotADirectory(dir.to_path_buf())
            } else {
                BpmaiError::FileNotFound(dir.to_path_buf())
            });
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| BpmaiError::io_with_path(e, dir))? {
            let entry = entry.map_err(|e| BpmaiError::io_with_path(e, dir))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry::new(entry.path(), is_dir));
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| BpmaiError::io_with_path(e, path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let temp_path = Self::temp_path_for(path);

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| BpmaiError::Io {
                    message: format!("Failed to create temp file {}", temp_path.display()),
                    path: Some(temp_path.clone()),
                    source: Some(e),
                })?;

            file.write_all(contents).map_err(|e| BpmaiError::Io {
                message: format!("Failed to write temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

            file.sync_all().map_err(|e| BpmaiError::Io {
                message: format!("Failed to sync temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(
                    "Failed to remove temp file {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(BpmaiError::Io {
                message: format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    path.display()
                ),
                path: Some(path.to_path_buf()),
                source: Some(e),
            });
        }

        debug!("Atomically wrote {}", path.display());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to).map_err(|e| BpmaiError::io_with_path(e, from))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| BpmaiError::Io {
            message: format!("Failed to create directory {}", path.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).map_err(|e| BpmaiError::io_with_path(e, path))
    }

    fn dirs_post_order(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in WalkDir::new(root).contents_first(true) {
            let entry = entry.map_err(|e| BpmaiError::Io {
                message: e.to_string(),
                path: e.path().map(Path::to_path_buf),
                source: None,
            })?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let fs = OsFileSystem::new();
        let path = temp_dir.path().join("a.bpmn");

        fs.write(&path, b"<definitions/>").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "<definitions/>");

        fs.write(&path, b"<definitions id=\"2\"/>").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "<definitions id=\"2\"/>");

        // No temp files left behind
        let names: Vec<_> = fs
            .list_dir(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.bpmn".to_string()]);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let fs = OsFileSystem::new();
        let path = temp_dir.path().join("missing").join("a.bpmn");
        assert!(fs.write(&path, b"x").is_err());
    }

    #[test]
    fn test_list_dir_errors() {
        let temp_dir = TempDir::new().unwrap();
        let fs = OsFileSystem::new();
        let file = temp_dir.path().join("a.json");
        std::fs::write(&file, "{}").unwrap();

        assert!(matches!(
            fs.list_dir(&temp_dir.path().join("nope")),
            Err(BpmaiError::FileNotFound(_))
        ));
        assert!(matches!(fs.list_dir(&file), Err(BpmaiError::NotADirectory(_))));
    }

    #[test]
    fn test_dirs_post_order_children_first() {
        let temp_dir = TempDir::new().unwrap();
        let fs = OsFileSystem::new();
        let nested = temp_dir.path().join("a").join("b");
        fs.create_dir_all(&nested).unwrap();

        let middle = temp_dir.path().join("a");

        let dirs = fs.dirs_post_order(temp_dir.path()).unwrap();
        let pos = |p: &Path| dirs.iter().position(|d| d.as_path() == p).unwrap();
        assert!(pos(nested.as_path()) < pos(middle.as_path()));
        assert!(pos(middle.as_path()) < pos(temp_dir.path()));
    }
}
