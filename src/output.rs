//! Tabular output
//!
//! Rows have the columns `fname, sentence, structure, data`, where `data` is a
//! JSON array of [`TokenRecord`](crate::projection::TokenRecord) objects.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::matcher::StructureMatch;

pub const COLUMNS: [&str; 4] = ["fname", "sentence", "structure", "data"];

/// One output row as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub fname: String,
    pub sentence: String,
    pub structure: String,
    pub data: String,
}

impl ResultRow {
    pub fn from_match(m: &StructureMatch) -> Result<Self> {
        Ok(Self {
            fname: m.fname.clone(),
            sentence: m.sentence.clone(),
            structure: m.structure.label().to_string(),
            data: serde_json::to_string(&m.data)?,
        })
    }
}

/// Matches accumulated for the current batch
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    pub rows: Vec<StructureMatch>,
    /// Documents that contributed to this batch, with or without matches
    pub documents: usize,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_document(&mut self, matches: Vec<StructureMatch>) {
        self.rows.extend(matches);
        self.documents += 1;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.documents = 0;
    }
}

/// Open a CSV writer at `path` and write the header
pub(crate) fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;
    writer
        .write_record(COLUMNS)
        .map_err(|e| Error::csv(path, e))?;
    Ok(writer)
}

/// Write `table` to `path`; the header is written even with no rows
pub fn write_table(table: &ResultTable, path: &Path) -> Result<usize> {
    let mut writer = create_writer(path)?;
    for m in &table.rows {
        writer
            .serialize(ResultRow::from_match(m)?)
            .map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(table.len())
}

/// Read every row of an output file back
pub fn read_rows(path: &Path) -> Result<Vec<ResultRow>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::csv(path, e))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<ResultRow>, _>>()
        .map_err(|e| Error::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::sentence_from_rows;
    use crate::matcher::scan_sentence;
    use crate::projection::TokenRecord;

    #[test]
    fn test_write_and_read_table() {
        let sentence = sentence_from_rows(&[
            "I I PRON PRP 2 nsubj",
            "saw see VERB VBD 0 ROOT",
            "\"quotes\", \"quote\", NOUN NNS 2 dobj",
        ]);
        let mut table = ResultTable::new();
        table.push_document(scan_sentence(&sentence, "essay", false).matches);
        table.push_document(Vec::new());
        assert_eq!(table.documents, 2);
        assert_eq!(table.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay_0.csv");
        assert_eq!(write_table(&table, &path).unwrap(), 1);

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fname, "essay");
        assert_eq!(rows[0].structure, "L1_L2_1st_person_prodrop");
        assert_eq!(rows[0].sentence, "I saw \"quotes\",");

        let data: Vec<TokenRecord> = serde_json::from_str(&rows[0].data).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].text, "I");
        assert_eq!(data[1].text, "saw");
    }

    #[test]
    fn test_empty_table_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty_0.csv");
        write_table(&ResultTable::new(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "fname,sentence,structure,data\n");
        assert!(read_rows(&path).unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut table = ResultTable::new();
        table.push_document(Vec::new());
        table.clear();
        assert_eq!(table.documents, 0);
        assert!(table.is_empty());
    }
}
