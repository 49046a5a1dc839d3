//! Model index: models joined with their metadata, persisted as CSV.

use super::metadata::build_metadata_table;
use crate::config::{AppConfig, ModelConventions};
use crate::error::{BpmaiError, Result};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Header row of a persisted index, in `IndexRow` field order.
pub const INDEX_HEADER: [&str; 4] = ["filename.meta", "filename", "language", "modelLanguage"];

/// A row in the model index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    /// Sidecar the row was read from. Absent in three-column index files.
    #[serde(rename = "filename.meta", default)]
    pub metadata_filename: String,
    /// Model file name, relative to the model directory.
    pub filename: String,
    pub language: String,
    #[serde(rename = "modelLanguage")]
    pub model_language: String,
}

/// Models that have both a model file and a metadata record.
///
/// Never mutated after construction; filters return new collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelIndex {
    rows: Vec<IndexRow>,
}

impl ModelIndex {
    pub fn from_rows(rows: Vec<IndexRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Paths of English models whose model language starts with `prefix`.
    pub fn filter(&self, base_path: &Path, prefix: &str) -> Vec<PathBuf> {
        self.filter_by(base_path, AppConfig::DEFAULT_LANGUAGE, prefix)
    }

    /// Paths of models in `language` (case-insensitive) whose model language
    /// starts with `prefix` (case-sensitive), in index order.
    pub fn filter_by(&self, base_path: &Path, language: &str, prefix: &str) -> Vec<PathBuf> {
        let paths: Vec<PathBuf> = self
            .rows
            .iter()
            .filter(|row| {
                row.language.eq_ignore_ascii_case(language)
                    && row.model_language.starts_with(prefix)
            })
            .map(|row| base_path.join(&row.filename))
            .collect();

        info!(
            "{} of {} indexed models match language '{}' and prefix '{}'",
            paths.len(),
            self.rows.len(),
            language,
            prefix
        );
        paths
    }

    /// Row count per model language, sorted by language.
    pub fn model_language_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.model_language.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(language, count)| (language.to_string(), count))
            .collect()
    }

    /// Write the index as CSV, replacing any existing file.
    pub fn save_csv(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        // serialize only emits the header along with the first row
        if self.rows.is_empty() {
            writer.write_record(INDEX_HEADER)?;
        }
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| BpmaiError::Csv {
            message: format!("Failed to flush index for {}: {}", path.display(), e),
            source: None,
        })?;

        fs.write(path, &bytes)?;
        debug!("Saved {} index rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Load an index written by `save_csv`, or a three-column
    /// `filename,language,modelLanguage` file.
    pub fn load_csv(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let contents = fs.read_to_string(path)?;
        let mut reader = csv::Reader::from_reader(contents.as_bytes());

        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let row: IndexRow = row.map_err(|e| BpmaiError::Csv {
                message: format!("Failed to read index {}: {}", path.display(), e),
                source: Some(e),
            })?;
            rows.push(row);
        }

        debug!("Loaded {} index rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }
}

/// Build the index of `model_dir`, optionally persisting it to `output_path`.
///
/// Model files are the `json` entries that are not sidecars. They are inner
/// joined with the metadata table on file name; models missing either side are
/// left out. A failed write is logged and the index is still returned.
pub fn build_index(
    fs: &dyn FileSystem,
    model_dir: &Path,
    output_path: Option<&Path>,
    conventions: &ModelConventions,
) -> Result<ModelIndex> {
    let model_files: HashSet<String> = fs
        .list_dir(model_dir)?
        .into_iter()
        .filter(|entry| {
            !entry.is_dir
                && conventions.has_model_extension(&entry.name)
                && !conventions.is_metadata_sidecar(&entry.name)
        })
        .map(|entry| entry.name)
        .collect();

    let metadata = build_metadata_table(fs, model_dir, conventions)?;
    let metadata_count = metadata.len();

    let rows: Vec<IndexRow> = metadata
        .into_iter()
        .filter(|record| model_files.contains(&record.model_filename))
        .map(|record| IndexRow {
            metadata_filename: record.metadata_filename,
            filename: record.model_filename,
            language: record.natural_language,
            model_language: record.modeling_language,
        })
        .collect();

    info!(
        "Indexed {} models in {} ({} model files, {} metadata records)",
        rows.len(),
        model_dir.display(),
        model_files.len(),
        metadata_count
    );

    let index = ModelIndex::from_rows(rows);
    if let Some(output_path) = output_path {
        if let Err(e) = index.save_csv(fs, output_path) {
            error!("Failed to write index {}: {}", output_path.display(), e);
        }
    }
    Ok(index)
}
