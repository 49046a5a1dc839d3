//! Model conversion from Signavio JSON to BPMN 2.0 XML.
//!
//! The transformation itself sits behind the `ModelTransformer` trait;
//! `CommandTransformer` reaches an external engine process. `TreeConverter`
//! drives the batch: per-file skip-if-exists, companion diagram copies,
//! directory mirroring and empty-directory pruning.

mod converter;
mod engine;
mod types;

pub use converter::{run_batch, TreeConverter};
pub use engine::{CommandTransformer, ModelTransformer};
pub use types::{ConversionOutcome, ConversionReport};
