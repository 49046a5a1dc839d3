//! Per-model metadata sidecars.
//!
//! A sidecar `<id>.meta.json` sits next to `<id>.json` and looks like:
//!
//! ```json
//! { "model": { "naturalLanguage": "en", "modelingLanguage": "bpmn20" } }
//! ```

use crate::config::ModelConventions;
use crate::error::{BpmaiError, Result};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Language attributes read from one sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadataRecord {
    pub metadata_filename: String,
    pub model_filename: String,
    pub natural_language: String,
    pub modeling_language: String,
}

/// Language fields of the sidecar's `model` object.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidecarModel {
    #[serde(default, deserialize_with = "lenient_string")]
    natural_language: String,
    #[serde(default, deserialize_with = "lenient_string")]
    modeling_language: String,
}

/// Non-string values count as missing.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Outcome of reading a single sidecar.
#[derive(Debug)]
pub enum SidecarParse {
    Record(ModelMetadataRecord),
    /// Valid JSON without a `model` object.
    NoRecord,
    /// The file could not be read or is not JSON.
    Unreadable(BpmaiError),
}

impl SidecarParse {
    /// Fold both skip variants into `None`.
    pub fn into_record(self) -> Option<ModelMetadataRecord> {
        match self {
            SidecarParse::Record(record) => Some(record),
            SidecarParse::NoRecord | SidecarParse::Unreadable(_) => None,
        }
    }
}

/// Parse one metadata sidecar.
///
/// Missing language fields become empty strings. Read and parse failures are
/// logged here and reported as `Unreadable`; callers skip the file either way.
pub fn parse_metadata_record(
    fs: &dyn FileSystem,
    path: &Path,
    conventions: &ModelConventions,
) -> SidecarParse {
    let contents = match fs.read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!("Failed to read metadata {}: {}", path.display(), e);
            return SidecarParse::Unreadable(e);
        }
    };

    let document: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to parse metadata {}: {}", path.display(), e);
            return SidecarParse::Unreadable(BpmaiError::Json {
                message: format!("Failed to parse {}: {}", path.display(), e),
                source: Some(e),
            });
        }
    };

    let model = match document.get("model") {
        Some(model @ serde_json::Value::Object(_)) => model.clone(),
        _ => {
            debug!("No model object in {}", path.display());
            return SidecarParse::NoRecord;
        }
    };

    let fields: SidecarModel = serde_json::from_value(model).unwrap_or_default();
    let metadata_filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    SidecarParse::Record(ModelMetadataRecord {
        model_filename: conventions.model_filename_for(&metadata_filename),
        metadata_filename,
        natural_language: fields.natural_language,
        modeling_language: fields.modeling_language,
    })
}

/// Read every sidecar directly inside `model_dir`.
///
/// Sidecars without a record are skipped. Order follows directory enumeration.
pub fn build_metadata_table(
    fs: &dyn FileSystem,
    model_dir: &Path,
    conventions: &ModelConventions,
) -> Result<Vec<ModelMetadataRecord>> {
    let sidecars: Vec<PathBuf> = fs
        .list_dir(model_dir)?
        .into_iter()
        .filter(|entry| !entry.is_dir && conventions.is_metadata_sidecar(&entry.name))
        .map(|entry| entry.path)
        .collect();

    let records: Vec<_> = sidecars
        .iter()
        .filter_map(|path| parse_metadata_record(fs, path, conventions).into_record())
        .collect();

    debug!(
        "Parsed {} of {} metadata sidecars in {}",
        records.len(),
        sidecars.len(),
        model_dir.display()
    );
    Ok(records)
}
