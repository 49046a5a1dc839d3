//! Filesystem trait and entry type.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// A single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// File name component, lossily converted to UTF-8.
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn new(path: PathBuf, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, is_dir }
    }
}

/// Minimal filesystem surface needed by a conversion run.
///
/// All operations are synchronous; handles never outlive a call.
pub trait FileSystem: Send + Sync {
    /// List the direct children of `dir` in enumeration order.
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>>;

    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write a whole file, replacing any previous content.
    ///
    /// The parent directory must already exist.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Copy a file. An existing destination is overwritten.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and any missing parents. Existing directories are fine.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Every directory under `root` (inclusive), children before parents.
    fn dirs_post_order(&self, root: &Path) -> Result<Vec<PathBuf>>;
}
