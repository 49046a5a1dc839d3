//! Model corpus index.
//!
//! This module provides:
//! - Metadata sidecar parsing
//! - The joined model index with language/prefix filtering
//! - CSV persistence of the index

mod metadata;
mod model_index;

pub use metadata::{
    build_metadata_table, parse_metadata_record, ModelMetadataRecord, SidecarParse,
};
pub use model_index::{build_index, IndexRow, ModelIndex};
