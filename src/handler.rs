//! Document-level scanning

use log::debug;

use crate::matcher::{StructureMatch, scan_sentence};
use crate::tree::Document;

/// Sentences between progress messages
const PROGRESS_EVERY: usize = 500;

/// Matches for one document plus its sentence count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentScan {
    pub matches: Vec<StructureMatch>,
    pub sentences: usize,
}

/// Scan every sentence of `doc`, keeping sentence order
pub fn handle_document(doc: &Document, fname: &str, academic: bool) -> DocumentScan {
    let mut result = DocumentScan::default();

    for (i, sentence) in doc.sentences.iter().enumerate() {
        if i > 0 && i % PROGRESS_EVERY == 0 {
            debug!("{}: sentence #{}", fname, i);
        }
        let scan = scan_sentence(sentence, fname, academic);
        result.matches.extend(scan.matches);
        result.sentences += scan.sentences;
    }

    result
}
