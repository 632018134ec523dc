//! Lingscan: batch detection of learner-language structures
//!
//! Scans dependency-parsed text for a fixed catalogue of grammatical
//! structures (possessives, comparatives and superlatives, article and
//! copula omission, pro-drop, tense/time-expression co-occurrence) and writes
//! one CSV row per match.

// Core modules
pub mod conllu; // CoNLL-U reading and writing
pub mod handler; // Document-level scanning
pub mod matcher; // Ordered structure rules
pub mod projection; // Token attribute records
pub mod tree; // Annotated document structures

// Pipeline
pub mod annotate; // Annotator seam
pub mod cache; // Cached annotations
pub mod config;
pub mod corpus; // File iteration and batching
pub mod error;
pub mod output; // CSV rows
pub mod unify;

// spaCy through pyo3
#[cfg(feature = "spacy")]
pub mod spacy;

// Re-exports for convenience
pub use annotate::{AnnotateError, Annotator, Unavailable};
pub use config::{Config, KbIdType, TimexyOptions};
pub use conllu::DocumentReader;
pub use corpus::{Corpus, RunSummary};
pub use error::{Error, Result};
pub use handler::{DocumentScan, handle_document};
pub use matcher::{RULES, SentenceScan, Structure, StructureMatch, scan_sentence};
pub use projection::{TokenRecord, project};
pub use tree::{Document, Features, Sentence, Token, TokenId};

#[cfg(feature = "spacy")]
pub use spacy::SpacyAnnotator;
