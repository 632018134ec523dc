//! Command-line entry point
//!
//! Reads every `*.txt` file in the read directory, scans each line for
//! learner-language structures and writes batched CSV files.

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use std::path::PathBuf;

use lingscan::{Annotator, Config, Corpus};

#[derive(Parser, Debug)]
#[command(
    name = "lingscan",
    version,
    about = "Detect learner-language structures in plain-text corpora"
)]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Directory with the input text files
    #[arg(long = "read-dir")]
    read_dir: Option<PathBuf>,

    /// Directory for the CSV output
    #[arg(long = "write-dir")]
    write_dir: Option<PathBuf>,

    /// Directory for cached annotations
    #[arg(long = "cache-dir")]
    cache_dir: Option<PathBuf>,

    /// Reuse and store annotations in the cache directory
    #[arg(long = "use-cache")]
    use_cache: bool,

    /// Also write all rows to a single unified_data.csv
    #[arg(long = "unify")]
    unify: bool,

    /// Documents per output file
    #[arg(long = "batch-size")]
    batch_size: Option<usize>,

    /// spaCy model name
    #[arg(long = "model")]
    model: Option<String>,

    /// Download the spaCy model before loading it
    #[arg(long = "download-model")]
    download_model: bool,

    /// Set logging level
    #[arg(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.log_level);

    let config = build_config(&args)?;
    let annotator = load_annotator(&config)?;

    let mut corpus = Corpus::new(&config, annotator)?;
    let summary = corpus.run()?;

    info!(
        "{} files, {} documents, {} sentences, {} matches",
        summary.files, summary.documents, summary.sentences, summary.matches
    );
    for (structure, count) in summary.counts() {
        info!("{}: {}", structure, count);
    }
    if let Some(unified) = &summary.unified {
        info!("Unified {} rows into {}", unified.rows, unified.path.display());
    }

    Ok(())
}

fn setup_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.init();
}

/// Configuration file first, then command-line overrides
fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(dir) = &args.read_dir {
        config.read_dir = dir.clone();
    }
    if let Some(dir) = &args.write_dir {
        config.write_dir = dir.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    config.use_cache |= args.use_cache;
    config.unify |= args.unify;
    config.download_model |= args.download_model;

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(feature = "spacy")]
fn load_annotator(config: &Config) -> Result<Box<dyn Annotator>> {
    let annotator =
        lingscan::SpacyAnnotator::load(&config.model, &config.timexy, config.download_model)
            .with_context(|| format!("failed to load spaCy model {}", config.model))?;
    Ok(Box::new(annotator))
}

#[cfg(not(feature = "spacy"))]
fn load_annotator(_config: &Config) -> Result<Box<dyn Annotator>> {
    log::warn!("Built without spaCy support; only cached annotations can be scanned");
    Ok(Box::new(lingscan::Unavailable))
}
