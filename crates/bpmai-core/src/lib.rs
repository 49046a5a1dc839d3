//! BPMAI Core - indexing and BPMN conversion of Signavio/BPMAI model collections.
//!
//! The crate has two jobs:
//! - build a CSV index of a model directory by joining model files with their
//!   `.meta.json` sidecars, and select models by language and model type
//! - convert JSON model files to BPMN 2.0 XML through an external engine,
//!   either mirroring a whole collection tree or from an index selection
//!
//! # Example
//!
//! ```rust,no_run
//! use bpmai_core::{CommandTransformer, OsFileSystem, TreeConverter};
//! use std::sync::Arc;
//!
//! fn main() -> bpmai_core::Result<()> {
//!     let engine = CommandTransformer::new("java", vec!["-jar".into(), "connector.jar".into()]);
//!     let converter = TreeConverter::new(
//!         "/data/modelCollection",
//!         "/data/modelCollection_transformed",
//!         Arc::new(OsFileSystem::new()),
//!         Box::new(engine),
//!     )?;
//!
//!     let report = converter.run_full()?;
//!     println!("Converted {} models", report.converted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod conversion;
pub mod error;
pub mod fs;
pub mod index;

// Re-export commonly used types
pub use config::{AppConfig, ConversionMode, ModelConventions, ResumePolicy, RunConfig};
pub use conversion::{
    run_batch, CommandTransformer, ConversionOutcome, ConversionReport, ModelTransformer,
    TreeConverter,
};
pub use error::{BpmaiError, Result};
pub use fs::{DirEntry, FileSystem, MemoryFileSystem, OsFileSystem};
pub use index::{
    build_index, build_metadata_table, parse_metadata_record, IndexRow, ModelIndex,
    ModelMetadataRecord, SidecarParse,
};
