//! Filesystem capability used by the indexer and converter.
//!
//! The on-disk tree is the only persistent state of a run, so every component
//! reaches it through the `FileSystem` trait:
//! - `OsFileSystem` for real runs (atomic writes, walkdir traversal)
//! - `MemoryFileSystem` for tests and dry experiments

mod memory;
mod os;
mod traits;

pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;
pub use traits::{DirEntry, FileSystem};
