//! bpmai - batch indexing and BPMN conversion of BPMAI model collections.
//!
//! Subcommands:
//! - `index`: join model files with their metadata sidecars into a CSV index
//! - `filter`: print the models of an index matching a language and type prefix
//! - `convert`: convert a collection to BPMN 2.0 XML through an external engine

use anyhow::{Context, Result};
use bpmai_core::{
    build_index, run_batch, AppConfig, CommandTransformer, ConversionMode, ModelConventions, ModelIndex,
    OsFileSystem, ResumePolicy, RunConfig,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = AppConfig::APP_NAME)]
#[command(about = "Index and convert Signavio/BPMAI model collections")]
struct Args {
    /// JSON run configuration for `convert`; command line flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the model index of a flat model directory
    Index {
        /// Directory holding `<id>.json` models and `<id>.meta.json` sidecars
        #[arg(long)]
        models: PathBuf,

        /// CSV file to write the index to
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the absolute paths of indexed models matching a selection
    Filter {
        /// Directory the index file names are relative to
        #[arg(long)]
        models: PathBuf,

        /// Previously written index CSV
        #[arg(long)]
        index: PathBuf,

        /// Case-sensitive model language prefix (e.g. bpmn20, UML22Class)
        #[arg(long, default_value = "bpmn20")]
        prefix: String,

        /// Natural language, compared case-insensitively
        #[arg(long, default_value = "en")]
        language: String,
    },

    /// Convert models to BPMN 2.0 XML
    Convert(ConvertArgs),
}

#[derive(clap::Args, Debug)]
struct ConvertArgs {
    /// Source collection directory
    #[arg(long)]
    source: Option<PathBuf>,

    /// Destination directory (created if missing)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Conversion mode: full or filtered
    #[arg(long)]
    mode: Option<ConversionMode>,

    /// Index CSV for filtered mode (built and written when missing)
    #[arg(long)]
    index: Option<PathBuf>,

    /// Model language prefix for filtered mode
    #[arg(long)]
    prefix: Option<String>,

    /// Natural language for filtered mode
    #[arg(long)]
    language: Option<String>,

    /// Resume policy for full mode: per-file or skip-started-directories
    #[arg(long)]
    resume: Option<ResumePolicy>,

    /// Engine command line, e.g. `--engine java -jar connector.jar`
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    engine: Vec<String>,
}

impl ConvertArgs {
    /// Merge the optional config file with the command line flags.
    fn into_run_config(self, config_path: Option<&Path>) -> Result<RunConfig> {
        let mut config = match config_path {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RunConfig::new(PathBuf::new(), PathBuf::new()),
        };

        if let Some(source) = self.source {
            config.source_dir = source;
        }
        if let Some(dest) = self.dest {
            config.dest_dir = dest;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(index) = self.index {
            config.index_path = Some(index);
        }
        if let Some(prefix) = self.prefix {
            config.prefix_filter = prefix;
        }
        if let Some(language) = self.language {
            config.language_filter = language;
        }
        if let Some(resume) = self.resume {
            config.resume = resume;
        }
        if !self.engine.is_empty() {
            config.engine_command = self.engine;
        }

        config.validate()?;
        Ok(config)
    }
}

/// `--debug` wins over `RUST_LOG`, which wins over the INFO default.
fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    FmtSubscriber::builder()
        .with_env_filter(log_filter(args.debug))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let fs = OsFileSystem::new();

    match args.command {
        Command::Index { models, output } => {
            let index = build_index(
                &fs,
                &models,
                output.as_deref(),
                &ModelConventions::default(),
            )
            .with_context(|| format!("Failed to index {}", models.display()))?;

            for (model_language, count) in index.model_language_counts() {
                let label = if model_language.is_empty() {
                    "<none>"
                } else {
                    model_language.as_str()
                };
                info!("{:>8}  {}", count, label);
            }
            info!("{} models indexed", index.len());
        }

        Command::Filter {
            models,
            index,
            prefix,
            language,
        } => {
            let index = ModelIndex::load_csv(&fs, &index)
                .with_context(|| format!("Failed to load index {}", index.display()))?;

            // Paths go to stdout for piping
            for path in index.filter_by(&models, &language, &prefix) {
                println!("{}", path.display());
            }
        }

        Command::Convert(convert) => {
            let config = convert.into_run_config(args.config.as_deref())?;
            let engine = CommandTransformer::from_command_line(&config.engine_command)?;

            info!(
                "Starting {} conversion of {} with engine {}",
                config.mode,
                config.source_dir.display(),
                engine.program()
            );
            if tracing::enabled!(Level::DEBUG) {
                tracing::debug!("Run configuration: {}", serde_json::to_string(&config)?);
            }

            let report = run_batch(&config, Arc::new(fs), Box::new(engine))
                .with_context(|| format!("Conversion of {} failed", config.source_dir.display()))?;

            if report.failed > 0 {
                info!(
                    "{} models failed to convert; re-run to retry them",
                    report.failed
                );
            }
        }
    }

    Ok(())
}
