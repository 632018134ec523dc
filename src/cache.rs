//! Cache of annotated documents, one gzip-compressed CoNLL-U file per input

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::conllu::{DocumentReader, write_document};
use crate::error::{Error, Result};
use crate::tree::Document;

const CACHE_EXTENSION: &str = "conllu.gz";

/// Cache file for the input with stem `stem`
pub fn cache_path(cache_dir: &Path, stem: &str) -> PathBuf {
    cache_dir.join(format!("{}.{}", stem, CACHE_EXTENSION))
}

/// Load cached documents; `Ok(None)` if there is no cache file
pub fn load(path: &Path) -> Result<Option<Vec<Document>>> {
    if !path.is_file() {
        debug!("No cache at {}", path.display());
        return Ok(None);
    }

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = DocumentReader::new(BufReader::new(GzDecoder::new(file)));
    let docs = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| Error::Cache {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded {} cached documents from {}", docs.len(), path.display());
    Ok(Some(docs))
}

/// Streams documents into a cache file
///
/// Output goes to a `.partial` temporary file next to the cache file. It is
/// renamed into place by [`CacheWriter::finish`]; dropping the writer without
/// finishing deletes it.
pub struct CacheWriter {
    path: PathBuf,
    encoder: GzEncoder<BufWriter<NamedTempFile>>,
    documents: usize,
}

impl CacheWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let prefix = path.file_name().unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".partial")
            .tempfile_in(dir)
            .map_err(|e| Error::io(dir, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            encoder: GzEncoder::new(BufWriter::new(file), Compression::default()),
            documents: 0,
        })
    }

    pub fn write(&mut self, doc: &Document) -> Result<()> {
        write_document(&mut self.encoder, doc).map_err(|e| Error::io(&self.path, e))?;
        self.documents += 1;
        Ok(())
    }

    /// Complete the file and move it into place; returns the document count
    pub fn finish(self) -> Result<usize> {
        let writer = self
            .encoder
            .finish()
            .map_err(|e| Error::io(&self.path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| Error::io(&self.path, e.into_error()))?;
        file.persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;

        debug!("Cached {} documents in {}", self.documents, self.path.display());
        Ok(self.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::sentence_from_rows;
    use crate::tree::{Sentence, Token};
    use std::io::Write;

    fn store(path: &Path, docs: &[Document]) {
        let mut writer = CacheWriter::create(path).unwrap();
        for doc in docs {
            writer.write(doc).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), docs.len());
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn docs() -> Vec<Document> {
        let mut first = Document::new();
        first.sentences.push(sentence_from_rows(&[
            "Yesterday yesterday NOUN NN 2 npadvmod _ EntType=DATE",
            "rained rain VERB VBD 0 ROOT Tense=Past|VerbForm=Fin SpaceAfter=No",
            ". . PUNCT . 2 punct",
        ]));
        vec![first, Document::new()]
    }

    #[test]
    fn test_missing_cache_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "absent");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "essays");
        assert_eq!(path.file_name().unwrap(), "essays.conllu.gz");

        let docs = docs();
        store(&path, &docs);
        assert_eq!(file_names(dir.path()), vec!["essays.conllu.gz"]);

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[1].sentences.is_empty());
        let sentence = &loaded[0].sentences[0];
        assert_eq!(sentence.text(), "Yesterday rained.");
        assert_eq!(sentence.tokens[0].ent_type, "DATE");
        assert_eq!(sentence.tokens[1].feats.get("Tense"), Some("Past"));
    }

    #[test]
    fn test_reload_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "odd");

        let mut sentence = Sentence::with_text(Some(" I\trun_\\ ".to_string()));
        sentence.push(Token::new(0, "I", "", "", "PRP", "").with_head(1));
        let mut tab = Token::new(1, "\t", "_", "_", "", "dep\nx").with_head(1);
        tab.ent_type = "DATE".to_string();
        sentence.push(tab);
        let mut doc = Document::new();
        doc.sentences.push(sentence);

        let mut rebuilt = Sentence::new();
        rebuilt.push(Token::new(0, "a\\_", "__", "X", "X", "ROOT"));
        let mut second = Document::new();
        second.sentences.push(rebuilt);

        let docs = vec![doc, second];
        store(&path, &docs);
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, docs);
        assert_eq!(loaded[0].sentences[0].text(), " I\trun_\\ ");
        assert_eq!(loaded[1].sentences[0].sentence_text, None);
    }

    #[test]
    fn test_empty_lemma_survives_reload() {
        // With its lemma lost, "I" would read back as a pro-drop subject
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "prodrop");

        let mut sentence = Sentence::new();
        sentence.push(Token::new(0, "I", "", "PRON", "PRP", "").with_head(1));
        sentence.push(Token::new(1, "run", "run", "VERB", "VBP", "ROOT"));
        let mut doc = Document::new();
        doc.sentences.push(sentence);

        let fresh = crate::handler::handle_document(&doc, "f", false);
        store(&path, std::slice::from_ref(&doc));
        let loaded = load(&path).unwrap().unwrap();
        let cached = crate::handler::handle_document(&loaded[0], "f", false);

        assert!(fresh.matches.is_empty());
        assert_eq!(cached, fresh);
    }

    #[test]
    fn test_unfinished_writer_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "aborted");

        let mut writer = CacheWriter::create(&path).unwrap();
        writer.write(&docs()[0]).unwrap();
        assert_eq!(file_names(dir.path()).len(), 1);
        drop(writer);

        assert!(file_names(dir.path()).is_empty());
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "broken");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"1\tonly\ttwo\n").unwrap();
        encoder.finish().unwrap();

        assert!(matches!(load(&path), Err(Error::Cache { .. })));
    }
}
