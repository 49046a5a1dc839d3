//! Types for model conversion runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of converting a single model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// BPMN written; `companion_copied` is false when the diagram was missing
    /// or could not be copied.
    Converted {
        output: PathBuf,
        companion_copied: bool,
    },
    /// Target already present, nothing done.
    AlreadyConverted,
    /// Read, engine or write failure; nothing written.
    Failed { reason: String },
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

/// Counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub converted: usize,
    pub already_converted: usize,
    pub failed: usize,
    /// Converted models whose companion diagram is absent from the output.
    pub companions_missing: usize,
    /// Top-level directories skipped because their mirror already existed.
    pub directories_skipped: usize,
    /// Empty destination directories removed by the cleanup pass.
    pub directories_pruned: usize,
}

impl ConversionReport {
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        match outcome {
            ConversionOutcome::Converted {
                companion_copied, ..
            } => {
                self.converted += 1;
                if !companion_copied {
                    self.companions_missing += 1;
                }
            }
            ConversionOutcome::AlreadyConverted => self.already_converted += 1,
            ConversionOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Models looked at, whatever the outcome.
    pub fn total(&self) -> usize {
        self.converted + self.already_converted + self.failed
    }
}
