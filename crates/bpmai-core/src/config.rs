//! Centralized configuration for the BPMAI converter.
//!
//! Naming conventions the corpus relies on, and the parameters of a batch run.

use crate::error::{BpmaiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application-level constants.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "bpmai";
    pub const DEFAULT_LANGUAGE: &'static str = "en";
    pub const DEFAULT_PREFIX: &'static str = "bpmn20";
}

/// File naming conventions of a BPMAI model collection.
///
/// Sidecars and companions are recognized by name only, never by content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ModelConventions {
    /// Substring marking a per-model metadata sidecar (`a.meta.json`).
    pub metadata_marker: String,
    /// Collection-level metadata file excluded from conversion.
    pub collection_metadata_name: String,
    pub model_extension: String,
    pub target_extension: String,
    pub companion_extension: String,
}

impl ModelConventions {
    pub const METADATA_MARKER: &'static str = ".meta.json";
    pub const COLLECTION_METADATA_NAME: &'static str = "metadata.json";
    pub const MODEL_EXTENSION: &'static str = "json";
    pub const TARGET_EXTENSION: &'static str = "bpmn";
    pub const COMPANION_EXTENSION: &'static str = "svg";

    /// Whether `name` is a per-model metadata sidecar.
    pub fn is_metadata_sidecar(&self, name: &str) -> bool {
        name.contains(&self.metadata_marker)
    }

    /// Whether `name` is any kind of metadata file (sidecar or collection level).
    pub fn is_metadata_file(&self, name: &str) -> bool {
        self.is_metadata_sidecar(name) || name.ends_with(&self.collection_metadata_name)
    }

    /// Whether `name` carries the model extension (case-insensitive).
    pub fn has_model_extension(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.model_extension))
    }

    /// Whether `name` is a model file the tree walk should convert.
    pub fn is_convertible_model(&self, name: &str) -> bool {
        self.has_model_extension(name) && !self.is_metadata_file(name)
    }

    /// Model file name described by a sidecar: `a.meta.json` -> `a.json`.
    pub fn model_filename_for(&self, metadata_filename: &str) -> String {
        metadata_filename.replacen(
            &self.metadata_marker,
            &format!(".{}", self.model_extension),
            1,
        )
    }

    /// Output file name for a model file: `a.json` -> `a.bpmn`.
    pub fn target_file_name(&self, input: &Path) -> Option<String> {
        let stem = input.file_stem()?.to_str()?;
        Some(format!("{}.{}", stem, self.target_extension))
    }

    /// Companion diagram sitting next to `path`: `dir/a.json` -> `dir/a.svg`.
    pub fn companion_path(&self, path: &Path) -> PathBuf {
        path.with_extension(&self.companion_extension)
    }
}

impl Default for ModelConventions {
    fn default() -> Self {
        Self {
            metadata_marker: Self::METADATA_MARKER.to_string(),
            collection_metadata_name: Self::COLLECTION_METADATA_NAME.to_string(),
            model_extension: Self::MODEL_EXTENSION.to_string(),
            target_extension: Self::TARGET_EXTENSION.to_string(),
            companion_extension: Self::COMPANION_EXTENSION.to_string(),
        }
    }
}

/// Which entry point a conversion run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Recursive mirror of the whole source tree.
    #[default]
    Full,
    /// Flat list of models selected through the index.
    Filtered,
}

impl ConversionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::Full => "full",
            ConversionMode::Filtered => "filtered",
        }
    }
}

impl FromStr for ConversionMode {
    type Err = BpmaiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(ConversionMode::Full),
            "filtered" => Ok(ConversionMode::Filtered),
            other => Err(BpmaiError::Config {
                message: format!("unknown conversion mode '{}'", other),
            }),
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a full run resumes over a partially converted destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Walk every directory; each already converted file is skipped.
    #[default]
    PerFile,
    /// Skip a top-level directory entirely once its mirror exists.
    SkipStartedDirectories,
}

impl ResumePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumePolicy::PerFile => "per-file",
            ResumePolicy::SkipStartedDirectories => "skip-started-directories",
        }
    }
}

impl FromStr for ResumePolicy {
    type Err = BpmaiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "per-file" => Ok(ResumePolicy::PerFile),
            "skip-started-directories" => Ok(ResumePolicy::SkipStartedDirectories),
            other => Err(BpmaiError::Config {
                message: format!("unknown resume policy '{}'", other),
            }),
        }
    }
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    #[serde(default)]
    pub index_path: Option<PathBuf>,
    #[serde(default = "default_language")]
    pub language_filter: String,
    #[serde(default = "default_prefix")]
    pub prefix_filter: String,
    #[serde(default)]
    pub mode: ConversionMode,
    #[serde(default)]
    pub resume: ResumePolicy,
    /// External engine invocation: program followed by its arguments.
    #[serde(default)]
    pub engine_command: Vec<String>,
    #[serde(default)]
    pub conventions: ModelConventions,
}

fn default_language() -> String {
    AppConfig::DEFAULT_LANGUAGE.to_string()
}

fn default_prefix() -> String {
    AppConfig::DEFAULT_PREFIX.to_string()
}

impl RunConfig {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            index_path: None,
            language_filter: default_language(),
            prefix_filter: default_prefix(),
            mode: ConversionMode::default(),
            resume: ResumePolicy::default(),
            engine_command: Vec::new(),
            conventions: ModelConventions::default(),
        }
    }

    /// Load a run configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| BpmaiError::io_with_path(e, path))?;
        serde_json::from_str(&contents).map_err(|e| BpmaiError::Json {
            message: format!("Failed to parse {}: {}", path.display(), e),
            source: Some(e),
        })
    }

    /// Check the fields a conversion run cannot do without.
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(BpmaiError::Config {
                message: "source_dir must not be empty".to_string(),
            });
        }
        if self.dest_dir.as_os_str().is_empty() {
            return Err(BpmaiError::Config {
                message: "dest_dir must not be empty".to_string(),
            });
        }
        if self.engine_command.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(BpmaiError::Config {
                message: "engine_command must name a program".to_string(),
            });
        }
        Ok(())
    }
}
