//! Directory tree conversion of model collections.
//!
//! Two entry points share the per-file `convert_one` step:
//! - `run_full` mirrors the source tree under the destination and prunes
//!   directories that end up empty
//! - `run_filtered` converts a flat, index-selected list into the destination
//!   root
//!
//! Every failure below the top level is logged and skipped. Re-running is the
//! recovery mechanism: finished outputs are never converted twice.

use super::engine::ModelTransformer;
use super::types::{ConversionOutcome, ConversionReport};
use crate::config::{AppConfig, ConversionMode, ModelConventions, ResumePolicy, RunConfig};
use crate::error::{BpmaiError, Result};
use crate::fs::FileSystem;
use crate::index::{build_index, ModelIndex};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Converts model JSON files to BPMN, mirroring the source layout.
pub struct TreeConverter {
    source_root: PathBuf,
    dest_root: PathBuf,
    fs: Arc<dyn FileSystem>,
    transformer: Box<dyn ModelTransformer>,
    conventions: ModelConventions,
    resume: ResumePolicy,
    language_filter: String,
    prefix_filter: String,
}

impl TreeConverter {
    /// Create a converter, creating the destination root if needed.
    ///
    /// Fails only when the destination cannot be created.
    pub fn new(
        source_root: impl Into<PathBuf>,
        dest_root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        transformer: Box<dyn ModelTransformer>,
    ) -> Result<Self> {
        let source_root = source_root.into();
        let dest_root = dest_root.into();

        if !fs.is_dir(&dest_root) {
            fs.create_dir_all(&dest_root)?;
            info!("Created destination directory {}", dest_root.display());
        }

        Ok(Self {
            source_root,
            dest_root,
            fs,
            transformer,
            conventions: ModelConventions::default(),
            resume: ResumePolicy::default(),
            language_filter: AppConfig::DEFAULT_LANGUAGE.to_string(),
            prefix_filter: AppConfig::DEFAULT_PREFIX.to_string(),
        })
    }

    /// Create a converter from a run configuration.
    pub fn from_config(
        config: &RunConfig,
        fs: Arc<dyn FileSystem>,
        transformer: Box<dyn ModelTransformer>,
    ) -> Result<Self> {
        Ok(
            Self::new(&config.source_dir, &config.dest_dir, fs, transformer)?
                .with_conventions(config.conventions.clone())
                .with_resume_policy(config.resume)
                .with_selection(&config.language_filter, &config.prefix_filter),
        )
    }

    pub fn with_conventions(mut self, conventions: ModelConventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_resume_policy(mut self, resume: ResumePolicy) -> Self {
        self.resume = resume;
        self
    }

    /// Language and model-language prefix used by `run_filtered`.
    pub fn with_selection(mut self, language: &str, prefix: &str) -> Self {
        self.language_filter = language.to_string();
        self.prefix_filter = prefix.to_string();
        self
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    // ========================================
    // Single file
    // ========================================

    /// Convert one model file into `output_dir`.
    ///
    /// A no-op when the target file already exists. Nothing is written when
    /// reading, the engine, or the write fails. A missing companion diagram
    /// does not undo the written output.
    pub fn convert_one(&self, input_file: &Path, output_dir: &Path) -> ConversionOutcome {
        let Some(output_name) = self.conventions.target_file_name(input_file) else {
            warn!("Cannot derive output name for {}", input_file.display());
            return ConversionOutcome::Failed {
                reason: format!("no usable file name in {}", input_file.display()),
            };
        };
        let output_file = output_dir.join(output_name);

        if self.fs.exists(&output_file) {
            debug!("Skipping {}: already converted", input_file.display());
            return ConversionOutcome::AlreadyConverted;
        }

        let model_json = match self.fs.read_to_string(input_file) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to read model {}: {}", input_file.display(), e);
                return ConversionOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let xml = match self.transformer.transform(&model_json) {
            Ok(xml) if !xml.trim().is_empty() => xml,
            Ok(_) => {
                let e = BpmaiError::EmptyOutput;
                error!("Failed to convert {}: {}", input_file.display(), e);
                return ConversionOutcome::Failed {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                error!("Failed to convert {}: {}", input_file.display(), e);
                return ConversionOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if let Err(e) = self.fs.write(&output_file, xml.as_bytes()) {
            error!("Failed to write {}: {}", output_file.display(), e);
            return ConversionOutcome::Failed {
                reason: e.to_string(),
            };
        }
        info!(
            "Converted {} -> {}",
            input_file.display(),
            output_file.display()
        );

        let companion_copied = self.copy_companion(input_file, &output_file);
        ConversionOutcome::Converted {
            output: output_file,
            companion_copied,
        }
    }

    /// Copy the diagram sharing `input_file`'s base name next to `output_file`.
    ///
    /// Returns whether the companion is present at the destination afterwards.
    fn copy_companion(&self, input_file: &Path, output_file: &Path) -> bool {
        let source = self.conventions.companion_path(input_file);
        let target = self.conventions.companion_path(output_file);

        if self.fs.exists(&target) {
            return true;
        }

        match self.fs.copy(&source, &target) {
            Ok(()) => {
                debug!("Copied {} -> {}", source.display(), target.display());
                true
            }
            Err(e) => {
                warn!(
                    "Failed to copy companion diagram {}: {}",
                    source.display(),
                    e
                );
                false
            }
        }
    }

    // ========================================
    // Full tree mode
    // ========================================

    /// Mirror `source_dir` under `target_dir`, converting every model on the way.
    pub fn walk(&self, source_dir: &Path, target_dir: &Path) -> ConversionReport {
        let mut report = ConversionReport::default();
        if let Err(e) = self.fs.create_dir_all(target_dir) {
            error!("Failed to create {}: {}", target_dir.display(), e);
            return report;
        }
        self.walk_into(source_dir, target_dir, &mut report);
        report
    }

    /// Files first, then subdirectories in enumeration order.
    fn walk_into(&self, source_dir: &Path, target_dir: &Path, report: &mut ConversionReport) {
        let entries = match self.fs.list_dir(source_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list {}: {}", source_dir.display(), e);
                return;
            }
        };

        for entry in entries
            .iter()
            .filter(|e| !e.is_dir && self.conventions.is_convertible_model(&e.name))
        {
            let outcome = self.convert_one(&entry.path, target_dir);
            report.record(&outcome);
        }

        for entry in entries.iter().filter(|e| e.is_dir && !self.is_dest_root(&e.path)) {
            let sub_target = target_dir.join(&entry.name);
            if !self.fs.exists(&sub_target) {
                if let Err(e) = self.fs.create_dir_all(&sub_target) {
                    error!("Failed to create {}: {}", sub_target.display(), e);
                    continue;
                }
            }
            self.walk_into(&entry.path, &sub_target, report);
        }
    }

    /// A destination nested in the source tree is never walked as input.
    fn is_dest_root(&self, dir: &Path) -> bool {
        if dir == self.dest_root.as_path() {
            debug!("Skipping {}: it is the destination", dir.display());
            return true;
        }
        false
    }

    /// Convert every top-level directory of the source root, then prune empty
    /// directories from the destination.
    ///
    /// Fails only when the source root cannot be listed.
    pub fn run_full(&self) -> Result<ConversionReport> {
        let entries = self.fs.list_dir(&self.source_root)?;
        let mut report = ConversionReport::default();

        info!(
            "Converting {} into {} ({} resume)",
            self.source_root.display(),
            self.dest_root.display(),
            self.resume
        );

        for dir in entries.iter().filter(|e| e.is_dir && !self.is_dest_root(&e.path)) {
            let target = self.dest_root.join(&dir.name);

            if self.resume == ResumePolicy::SkipStartedDirectories && self.fs.exists(&target) {
                info!("Skipping {}: {} already exists", dir.name, target.display());
                report.directories_skipped += 1;
                continue;
            }

            if let Err(e) = self.fs.create_dir_all(&target) {
                error!("Failed to create {}: {}", target.display(), e);
                continue;
            }
            self.walk_into(&dir.path, &target, &mut report);
        }

        report.directories_pruned = self.prune_empty_dirs();
        log_report("Full conversion", &report);
        Ok(report)
    }

    /// Remove every empty directory below the destination root, deepest first.
    ///
    /// The destination root itself is kept.
    pub fn prune_empty_dirs(&self) -> usize {
        let dirs = match self.fs.dirs_post_order(&self.dest_root) {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to scan {}: {}", self.dest_root.display(), e);
                return 0;
            }
        };

        let mut removed = 0;
        for dir in dirs.iter().filter(|d| d.as_path() != self.dest_root) {
            match self.fs.list_dir(dir) {
                Ok(entries) if entries.is_empty() => match self.fs.remove_dir(dir) {
                    Ok(()) => {
                        debug!("Removed empty directory {}", dir.display());
                        removed += 1;
                    }
                    Err(e) => warn!("Failed to remove {}: {}", dir.display(), e),
                },
                Ok(_) => {}
                Err(e) => warn!("Failed to list {}: {}", dir.display(), e),
            }
        }
        removed
    }

    // ========================================
    // Filtered mode
    // ========================================

    /// Load the index from `index_path` when it exists, otherwise build it from
    /// the source root (persisting it to `index_path` when given).
    pub fn load_or_build_index(&self, index_path: Option<&Path>) -> Result<ModelIndex> {
        match index_path {
            Some(path) if self.fs.exists(path) => {
                info!("Loading model index from {}", path.display());
                ModelIndex::load_csv(self.fs.as_ref(), path)
            }
            _ => build_index(
                self.fs.as_ref(),
                &self.source_root,
                index_path,
                &self.conventions,
            ),
        }
    }

    /// Convert the models selected from `index` straight into the destination
    /// root. No mirroring, no pruning.
    pub fn run_filtered(&self, index: &ModelIndex) -> ConversionReport {
        let files = index.filter_by(&self.source_root, &self.language_filter, &self.prefix_filter);
        let mut report = ConversionReport::default();

        for file in &files {
            let outcome = self.convert_one(file, &self.dest_root);
            report.record(&outcome);

            // Earlier runs may have left the output without its diagram.
            if outcome == ConversionOutcome::AlreadyConverted {
                if let Some(name) = self.conventions.target_file_name(file) {
                    let output_file = self.dest_root.join(name);
                    if !self.copy_companion(file, &output_file) {
                        report.companions_missing += 1;
                    }
                }
            }
        }

        log_report("Filtered conversion", &report);
        report
    }

    /// Run the configured entry point.
    pub fn run(&self, mode: ConversionMode, index_path: Option<&Path>) -> Result<ConversionReport> {
        match mode {
            ConversionMode::Full => self.run_full(),
            ConversionMode::Filtered => {
                let index = self.load_or_build_index(index_path)?;
                Ok(self.run_filtered(&index))
            }
        }
    }
}

/// Build a converter from `config` and run it.
pub fn run_batch(
    config: &RunConfig,
    fs: Arc<dyn FileSystem>,
    transformer: Box<dyn ModelTransformer>,
) -> Result<ConversionReport> {
    let converter = TreeConverter::from_config(config, fs, transformer)?;
    converter.run(config.mode, config.index_path.as_deref())
}

fn log_report(label: &str, report: &ConversionReport) {
    info!(
        "{} finished: {} converted, {} already converted, {} failed, {} companions missing, \
         {} directories skipped, {} directories pruned",
        label,
        report.converted,
        report.already_converted,
        report.failed,
        report.companions_missing,
        report.directories_skipped,
        report.directories_pruned
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::index::IndexRow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FAIL_MARKER: &str = "\"broken\"";

    /// Wraps the model JSON in a fake BPMN document; fails on `FAIL_MARKER`.
    fn fake_engine(calls: Arc<AtomicUsize>) -> Box<dyn ModelTransformer> {
        Box::new(move |json: &str| -> Result<String> {
            calls.fetch_add(1, Ordering::SeqCst);
            if json.contains(FAIL_MARKER) {
                Err(BpmaiError::TransformFailed {
                    message: "unsupported stencil".to_string(),
                })
            } else {
                Ok(format!("<definitions>{}</definitions>", json.trim()))
            }
        })
    }

    fn setup() -> (Arc<MemoryFileSystem>, Arc<AtomicUsize>, TreeConverter) {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.create_dir_all(Path::new("/src")).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let converter =
            TreeConverter::new("/src", "/out", fs.clone(), fake_engine(calls.clone())).unwrap();
        (fs, calls, converter)
    }

    fn read(fs: &MemoryFileSystem, path: &str) -> String {
        fs.read_to_string(Path::new(path)).unwrap()
    }

    #[test]
    fn test_new_creates_destination() {
        let (fs, _, converter) = setup();
        assert!(fs.is_dir(Path::new("/out")));
        assert_eq!(converter.dest_root(), Path::new("/out"));
    }

    #[test]
    fn test_new_fails_when_destination_is_a_file() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/out", "not a dir").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(TreeConverter::new("/src", "/out", fs, fake_engine(calls)).is_err());
    }

    #[test]
    fn test_convert_one_writes_output_and_companion() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/a.json", "{\"id\": 1}").unwrap();
        fs.add_file("/src/a.svg", "<svg/>").unwrap();

        let outcome = converter.convert_one(Path::new("/src/a.json"), Path::new("/out"));
        assert_eq!(
            outcome,
            ConversionOutcome::Converted {
                output: PathBuf::from("/out/a.bpmn"),
                companion_copied: true,
            }
        );
        assert_eq!(read(&fs, "/out/a.bpmn"), "<definitions>{\"id\": 1}</definitions>");
        assert_eq!(read(&fs, "/out/a.svg"), "<svg/>");
    }

    #[test]
    fn test_convert_one_is_idempotent() {
        let (fs, calls, converter) = setup();
        fs.add_file("/src/a.json", "{}").unwrap();

        assert!(converter
            .convert_one(Path::new("/src/a.json"), Path::new("/out"))
            .is_converted());
        assert_eq!(
            converter.convert_one(Path::new("/src/a.json"), Path::new("/out")),
            ConversionOutcome::AlreadyConverted
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_convert_one_engine_failure_writes_nothing() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/a.json", "{\"broken\": true}").unwrap();
        fs.add_file("/src/a.svg", "<svg/>").unwrap();

        let outcome = converter.convert_one(Path::new("/src/a.json"), Path::new("/out"));
        assert!(matches!(outcome, ConversionOutcome::Failed { .. }));
        assert!(!fs.exists(Path::new("/out/a.bpmn")));
        assert!(!fs.exists(Path::new("/out/a.svg")));
    }

    #[test]
    fn test_convert_one_blank_output_writes_nothing() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/src/a.json", "{}").unwrap();
        let blank = Box::new(|_: &str| -> Result<String> { Ok("  \n".to_string()) });
        let converter = TreeConverter::new("/src", "/out", fs.clone(), blank).unwrap();

        let outcome = converter.convert_one(Path::new("/src/a.json"), Path::new("/out"));
        assert_eq!(
            outcome,
            ConversionOutcome::Failed {
                reason: BpmaiError::EmptyOutput.to_string()
            }
        );
        assert!(!fs.exists(Path::new("/out/a.bpmn")));
    }

    #[test]
    fn test_convert_one_missing_companion_keeps_output() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/a.json", "{}").unwrap();

        let outcome = converter.convert_one(Path::new("/src/a.json"), Path::new("/out"));
        assert_eq!(
            outcome,
            ConversionOutcome::Converted {
                output: PathBuf::from("/out/a.bpmn"),
                companion_copied: false,
            }
        );
        assert!(fs.exists(Path::new("/out/a.bpmn")));
    }

    #[test]
    fn test_convert_one_unreadable_input() {
        let (_, calls, converter) = setup();
        let outcome = converter.convert_one(Path::new("/src/missing.json"), Path::new("/out"));
        assert!(matches!(outcome, ConversionOutcome::Failed { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_walk_mirrors_tree_files_first() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/p/1.json", "{}").unwrap();
        fs.add_file("/src/p/1.meta.json", "{\"model\": {}}").unwrap();
        fs.add_file("/src/p/metadata.json", "{}").unwrap();
        fs.add_file("/src/p/notes.txt", "x").unwrap();
        fs.add_file("/src/p/q/2.json", "{}").unwrap();

        let report = converter.walk(Path::new("/src/p"), Path::new("/out/p"));
        assert_eq!(report.converted, 2);
        assert!(fs.exists(Path::new("/out/p/1.bpmn")));
        assert!(fs.exists(Path::new("/out/p/q/2.bpmn")));
        assert!(!fs.exists(Path::new("/out/p/1.meta.bpmn")));
        assert!(!fs.exists(Path::new("/out/p/metadata.bpmn")));
    }

    #[test]
    fn test_run_full_prunes_unconvertible_directories() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/good/1.json", "{}").unwrap();
        fs.add_file("/src/good/1.svg", "<svg/>").unwrap();
        fs.add_file("/src/good/bad/2.json", "{\"broken\": 1}").unwrap();
        fs.add_file("/src/good/bad/deeper/3.json", "{\"broken\": 1}").unwrap();
        fs.add_file("/src/empty/readme.txt", "x").unwrap();

        let report = converter.run_full().unwrap();
        assert_eq!(report.converted, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.directories_pruned, 3);

        assert!(fs.exists(Path::new("/out/good/1.bpmn")));
        assert!(fs.exists(Path::new("/out/good/1.svg")));
        assert!(!fs.exists(Path::new("/out/good/bad")));
        assert!(!fs.exists(Path::new("/out/empty")));
        assert!(fs.is_dir(Path::new("/out")));
    }

    #[test]
    fn test_run_full_per_file_resume_finishes_started_directory() {
        let (fs, calls, converter) = setup();
        fs.add_file("/src/p/1.json", "{}").unwrap();
        fs.add_file("/src/p/2.json", "{}").unwrap();
        // Interrupted earlier run: mirror exists with one output
        fs.add_file("/out/p/1.bpmn", "<definitions/>").unwrap();

        let report = converter.run_full().unwrap();
        assert_eq!(report.already_converted, 1);
        assert_eq!(report.converted, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fs.exists(Path::new("/out/p/2.bpmn")));
    }

    #[test]
    fn test_run_full_skip_started_directories() {
        let (fs, calls, converter) = setup();
        let converter = converter.with_resume_policy(ResumePolicy::SkipStartedDirectories);
        fs.add_file("/src/p/1.json", "{}").unwrap();
        fs.add_file("/src/p/2.json", "{}").unwrap();
        fs.add_file("/src/r/3.json", "{}").unwrap();
        fs.add_file("/out/p/1.bpmn", "<definitions/>").unwrap();

        let report = converter.run_full().unwrap();
        assert_eq!(report.directories_skipped, 1);
        assert_eq!(report.converted, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!fs.exists(Path::new("/out/p/2.bpmn")));
        assert!(fs.exists(Path::new("/out/r/3.bpmn")));
    }

    #[test]
    fn test_run_full_destination_nested_in_source() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/src/p/1.json", "{}").unwrap();
        fs.add_file("/src/p/out/2.json", "{}").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        // Destination directly under the source root
        let converter =
            TreeConverter::new("/src", "/src/out", fs.clone(), fake_engine(calls))
                .unwrap();
        let report = converter.run_full().unwrap();
        assert_eq!(report.converted, 2);
        assert!(fs.exists(Path::new("/src/out/p/1.bpmn")));
        assert!(fs.exists(Path::new("/src/out/p/out/2.bpmn")));
        assert!(!fs.exists(Path::new("/src/out/out")));
    }

    #[test]
    fn test_run_full_destination_deep_in_source() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/src/p/1.json", "{}").unwrap();
        fs.add_file("/src/p/out/2.json", "{}").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let converter =
            TreeConverter::new("/src", "/src/p/out/deep", fs.clone(), fake_engine(calls))
                .unwrap();
        let report = converter.run_full().unwrap();
        assert_eq!(report.converted, 2);
        assert!(fs.exists(Path::new("/src/p/out/deep/p/1.bpmn")));
        assert!(fs.exists(Path::new("/src/p/out/deep/p/out/2.bpmn")));
        assert!(!fs.exists(Path::new("/src/p/out/deep/p/out/deep")));
    }

    #[test]
    fn test_run_full_missing_source_is_fatal() {
        let fs = Arc::new(MemoryFileSystem::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let converter = TreeConverter::new("/nope", "/out", fs, fake_engine(calls)).unwrap();
        assert!(converter.run_full().is_err());
    }

    #[test]
    fn test_run_filtered_flat_output() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/x.json", "{}").unwrap();
        fs.add_file("/src/x.svg", "<svg/>").unwrap();
        fs.add_file("/src/y.json", "{}").unwrap();
        let index = ModelIndex::from_rows(vec![
            IndexRow {
                metadata_filename: "x.meta.json".to_string(),
                filename: "x.json".to_string(),
                language: "EN".to_string(),
                model_language: "bpmn20_v1".to_string(),
            },
            IndexRow {
                metadata_filename: "y.meta.json".to_string(),
                filename: "y.json".to_string(),
                language: "en".to_string(),
                model_language: "UML22Class".to_string(),
            },
        ]);

        let report = converter.run_filtered(&index);
        assert_eq!(report.converted, 1);
        assert!(fs.exists(Path::new("/out/x.bpmn")));
        assert!(fs.exists(Path::new("/out/x.svg")));
        assert!(!fs.exists(Path::new("/out/y.bpmn")));
    }

    #[test]
    fn test_run_filtered_restores_missing_companion() {
        let (fs, calls, converter) = setup();
        fs.add_file("/src/x.json", "{}").unwrap();
        fs.add_file("/src/x.svg", "<svg/>").unwrap();
        fs.add_file("/out/x.bpmn", "<definitions/>").unwrap();
        let index = ModelIndex::from_rows(vec![IndexRow {
            metadata_filename: String::new(),
            filename: "x.json".to_string(),
            language: "en".to_string(),
            model_language: "bpmn20".to_string(),
        }]);

        let report = converter.run_filtered(&index);
        assert_eq!(report.already_converted, 1);
        assert_eq!(report.companions_missing, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(read(&fs, "/out/x.svg"), "<svg/>");
    }

    #[test]
    fn test_run_filtered_failed_model_gets_no_companion() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/x.json", "{\"broken\": true}").unwrap();
        fs.add_file("/src/x.svg", "<svg/>").unwrap();
        let index = ModelIndex::from_rows(vec![IndexRow {
            metadata_filename: String::new(),
            filename: "x.json".to_string(),
            language: "en".to_string(),
            model_language: "bpmn20".to_string(),
        }]);

        let report = converter.run_filtered(&index);
        assert_eq!(report.failed, 1);
        assert_eq!(report.companions_missing, 0);
        assert!(!fs.exists(Path::new("/out/x.bpmn")));
        assert!(!fs.exists(Path::new("/out/x.svg")));
    }

    #[test]
    fn test_run_filtered_builds_and_persists_index() {
        let (fs, _, converter) = setup();
        fs.add_file("/src/x.json", "{}").unwrap();
        fs.add_file(
            "/src/x.meta.json",
            r#"{"model": {"naturalLanguage": "en", "modelingLanguage": "bpmn20"}}"#,
        )
        .unwrap();

        let report = converter
            .run(ConversionMode::Filtered, Some(Path::new("/out/index.csv")))
            .unwrap();
        assert_eq!(report.converted, 1);
        assert!(fs.exists(Path::new("/out/index.csv")));

        // Second run loads the persisted index and skips the finished model
        let report = converter
            .run(ConversionMode::Filtered, Some(Path::new("/out/index.csv")))
            .unwrap();
        assert_eq!(report.already_converted, 1);
    }
}
