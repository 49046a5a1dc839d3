//! In-memory `FileSystem` for tests.
//!
//! Mirrors the host semantics the converter depends on: writes and copies
//! need an existing parent directory, and only empty directories can be
//! removed. Listing order is lexical.

use super::traits::{DirEntry, FileSystem};
use crate::error::{BpmaiError, Result};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// Filesystem kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
}

fn not_found(path: &Path) -> BpmaiError {
    BpmaiError::FileNotFound(path.to_path_buf())
}

fn poisoned() -> BpmaiError {
    BpmaiError::Other("In-memory filesystem lock poisoned".to_string())
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file with its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        self.write(path, contents.as_ref())
    }

    /// Number of regular files currently stored.
    pub fn file_count(&self) -> usize {
        self.nodes
            .read()
            .map(|nodes| nodes.values().filter(|n| matches!(n, Node::File(_))).count())
            .unwrap_or(0)
    }

    fn parent_is_dir(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(p) if p.as_os_str().is_empty() || p.parent().is_none() => true,
            Some(p) => matches!(nodes.get(p), Some(Node::Dir)),
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let nodes = self.nodes.read().map_err(|_| poisoned())?;
        match nodes.get(dir) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => return Err(BpmaiError::NotADirectory(dir.to_path_buf())),
            None => return Err(not_found(dir)),
        }

        Ok(nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, node)| DirEntry::new(path.clone(), matches!(node, Node::Dir)))
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let nodes = self.nodes.read().map_err(|_| poisoned())?;
        match nodes.get(path) {
            Some(Node::File(bytes)) => String::from_utf8(bytes.clone()).map_err(|e| {
                BpmaiError::io_with_path(io::Error::new(io::ErrorKind::InvalidData, e), path)
            }),
            Some(Node::Dir) => Err(BpmaiError::Io {
                message: "Is a directory".to_string(),
                path: Some(path.to_path_buf()),
                source: None,
            }),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut nodes = self.nodes.write().map_err(|_| poisoned())?;
        if !Self::parent_is_dir(&nodes, path) {
            return Err(not_found(path));
        }
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(BpmaiError::Io {
                message: "Is a directory".to_string(),
                path: Some(path.to_path_buf()),
                source: None,
            });
        }
        nodes.insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let contents = {
            let nodes = self.nodes.read().map_err(|_| poisoned())?;
            match nodes.get(from) {
                Some(Node::File(bytes)) => bytes.clone(),
                _ => return Err(not_found(from)),
            }
        };
        self.write(to, &contents)
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes
            .read()
            .map(|nodes| nodes.contains_key(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.nodes
            .read()
            .map(|nodes| matches!(nodes.get(path), Some(Node::Dir)))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut nodes = self.nodes.write().map_err(|_| poisoned())?;
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor.parent().is_none() {
                continue;
            }
            match nodes.get(ancestor) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(BpmaiError::NotADirectory(ancestor.to_path_buf()))
                }
                None => {
                    nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let mut nodes = self.nodes.write().map_err(|_| poisoned())?;
        match nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => return Err(BpmaiError::NotADirectory(path.to_path_buf())),
            None => return Err(not_found(path)),
        }
        if nodes.keys().any(|p| p.parent() == Some(path)) {
            return Err(BpmaiError::Io {
                message: "Directory not empty".to_string(),
                path: Some(path.to_path_buf()),
                source: None,
            });
        }
        nodes.remove(path);
        Ok(())
    }

    fn dirs_post_order(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let nodes = self.nodes.read().map_err(|_| poisoned())?;
        if !matches!(nodes.get(root), Some(Node::Dir)) {
            return Err(not_found(root));
        }

        let mut dirs: Vec<PathBuf> = nodes
            .iter()
            .filter(|(path, node)| matches!(node, Node::Dir) && path.starts_with(root))
            .map(|(path, _)| path.clone())
            .collect();
        dirs.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });
        Ok(dirs)
    }
}
