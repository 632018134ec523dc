//! Corpus driver
//!
//! Walks the input directory one file at a time. Every line of a file is one
//! document; documents are annotated (or taken from the cache), scanned, and
//! their matches written out in batches of `batch_size` documents to
//! `{stem}_{n}.csv`.

use bstr::ByteSlice;
use bstr::io::BufReadExt;
use log::{debug, info};
use rustc_hash::FxHashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::annotate::Annotator;
use crate::cache::{self, CacheWriter};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handler::handle_document;
use crate::matcher::{Structure, StructureMatch};
use crate::output::{ResultTable, write_table};
use crate::tree::Document;
use crate::unify::{UnifySummary, unify};

/// Totals for a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files: usize,
    pub documents: usize,
    pub sentences: usize,
    pub matches: usize,
    /// Batch files in the order they were written
    pub outputs: Vec<PathBuf>,
    pub structure_counts: FxHashMap<Structure, usize>,
    pub unified: Option<UnifySummary>,
}

impl RunSummary {
    fn record(&mut self, matches: &[StructureMatch]) {
        self.matches += matches.len();
        for m in matches {
            *self.structure_counts.entry(m.structure).or_default() += 1;
        }
    }

    /// Per-structure counts in label vocabulary order, zeros omitted
    pub fn counts(&self) -> Vec<(Structure, usize)> {
        Structure::ALL
            .into_iter()
            .filter_map(|s| self.structure_counts.get(&s).map(|&n| (s, n)))
            .collect()
    }
}

/// Files in `dir` with extension `ext`, sorted
pub(crate) fn list_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(ext)
    );
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Read `path` line by line, dropping bytes that are not valid UTF-8
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).byte_lines() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let mut text = String::with_capacity(line.len());
        for chunk in ByteSlice::utf8_chunks(line.as_slice()) {
            text.push_str(chunk.valid());
        }
        lines.push(text);
    }
    Ok(lines)
}

/// Batching state for one input file
struct FileBatches<'a> {
    write_dir: &'a Path,
    stem: String,
    academic: bool,
    batch_size: usize,
    next_index: usize,
    seen: usize,
    table: ResultTable,
}

impl<'a> FileBatches<'a> {
    fn new(config: &'a Config, stem: String) -> Self {
        Self {
            write_dir: &config.write_dir,
            academic: config.is_academic(&stem),
            stem,
            batch_size: config.batch_size,
            next_index: 0,
            seen: 0,
            table: ResultTable::new(),
        }
    }

    fn add(&mut self, doc: &Document, summary: &mut RunSummary) -> Result<()> {
        let scan = handle_document(doc, &self.stem, self.academic);
        summary.documents += 1;
        summary.sentences += scan.sentences;
        summary.record(&scan.matches);

        self.table.push_document(scan.matches);
        self.seen += 1;
        if self.table.documents >= self.batch_size {
            self.flush(summary)?;
        }
        Ok(())
    }

    /// Write the current batch, if it covers at least one document
    fn flush(&mut self, summary: &mut RunSummary) -> Result<()> {
        if self.table.documents == 0 {
            return Ok(());
        }
        let path = self
            .write_dir
            .join(format!("{}_{}.csv", self.stem, self.next_index));
        info!("doc#{}, writing to file {}", self.seen, path.display());
        let rows = write_table(&self.table, &path)?;
        debug!("{} rows written to {}", rows, path.display());

        summary.outputs.push(path);
        self.next_index += 1;
        self.table.clear();
        Ok(())
    }
}

/// Drives a run over `config.read_dir`
pub struct Corpus<'a, A: Annotator> {
    config: &'a Config,
    annotator: A,
}

impl<'a, A: Annotator> Corpus<'a, A> {
    pub fn new(config: &'a Config, annotator: A) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, annotator })
    }

    pub fn annotator(&self) -> &A {
        &self.annotator
    }

    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        list_files(&self.config.read_dir, &self.config.input_extension)
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Start");
        let config = self.config;
        let mut summary = RunSummary::default();

        let write_dir = &config.write_dir;
        fs::create_dir_all(write_dir).map_err(|e| Error::io(write_dir, e))?;
        if let Some(cache_dir) = config.cache() {
            fs::create_dir_all(cache_dir).map_err(|e| Error::io(cache_dir, e))?;
        }

        for (i, path) in self.input_files()?.iter().enumerate() {
            info!("{} {}", path.display(), i);
            self.process_file(path, &mut summary)?;
            summary.files += 1;
        }
        info!("Number of sentences found: {}", summary.sentences);

        if config.unify {
            summary.unified = Some(unify(write_dir, &config.unified_path())?);
        }

        info!("FIN");
        Ok(summary)
    }

    /// Scan one input file, writing its batches
    pub fn process_file(&mut self, path: &Path, summary: &mut RunSummary) -> Result<()> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let cache_file = self.config.cache().map(|dir| cache::cache_path(dir, &stem));
        let cached = match &cache_file {
            Some(cache_file) => cache::load(cache_file)?,
            None => None,
        };

        let mut batches = FileBatches::new(self.config, stem);

        match cached {
            Some(docs) => {
                info!("Using {} cached documents for {}", docs.len(), path.display());
                for doc in &docs {
                    batches.add(doc, summary)?;
                }
            }
            None => {
                let mut cache_writer = cache_file
                    .as_deref()
                    .map(CacheWriter::create)
                    .transpose()?;
                for line in read_lines(path)? {
                    let doc = self.annotator.annotate(line.trim())?;
                    if let Some(writer) = cache_writer.as_mut() {
                        writer.write(&doc)?;
                    }
                    batches.add(&doc, summary)?;
                }
                if let Some(writer) = cache_writer {
                    writer.finish()?;
                }
            }
        }

        batches.flush(summary)
    }
}
