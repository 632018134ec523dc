//! spaCy annotation through an embedded Python interpreter
//!
//! Loads a spaCy model, adds the timexy time-expression component in front of
//! the entity recognizer, and converts each spaCy `Doc` into a [`Document`].
//! Requires a Python environment with `spacy`, `timexy` and the model
//! installed (or `download_model` set).

use log::info;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::annotate::{AnnotateError, Annotator};
use crate::config::TimexyOptions;
use crate::tree::{Document, Features, Sentence, Token};

impl From<PyErr> for AnnotateError {
    fn from(err: PyErr) -> Self {
        AnnotateError::Pipeline(err.to_string())
    }
}

/// A loaded spaCy pipeline
pub struct SpacyAnnotator {
    nlp: Py<PyAny>,
}

impl SpacyAnnotator {
    /// Load `model` and add the timexy component before `ner`
    pub fn load(model: &str, timexy: &TimexyOptions, download: bool) -> Result<Self, AnnotateError> {
        Python::attach(|py| {
            if download {
                info!("Downloading spaCy model {}", model);
                py.import("spacy.cli")?.call_method1("download", (model,))?;
            }

            let spacy = py.import("spacy")?;
            // Importing timexy registers its pipeline factory
            py.import("timexy")?;

            info!("Loading spaCy model {}", model);
            let nlp = spacy.call_method1("load", (model,))?;

            let config = PyDict::new(py);
            config.set_item("kb_id_type", timexy.kb_id_type.as_str())?;
            config.set_item("label", timexy.label.as_str())?;
            config.set_item("overwrite", timexy.overwrite)?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("config", config)?;
            kwargs.set_item("before", "ner")?;
            nlp.call_method("add_pipe", ("timexy",), Some(&kwargs))?;

            Ok(Self { nlp: nlp.unbind() })
        })
    }
}

impl Annotator for SpacyAnnotator {
    fn annotate(&mut self, text: &str) -> Result<Document, AnnotateError> {
        Python::attach(|py| {
            let doc = self.nlp.bind(py).call1((text,))?;
            let mut document = Document::new();

            for sent in doc.getattr("sents")?.try_iter()? {
                let sent = sent?;
                let start: usize = sent.getattr("start")?.extract()?;
                let sent_text: String = sent.getattr("text")?.extract()?;
                let mut sentence = Sentence::with_text(Some(sent_text));

                for (id, token) in sent.try_iter()?.enumerate() {
                    let token = token?;
                    sentence.tokens.push(convert_token(&token, id, start)?);
                }
                document.sentences.push(sentence);
            }

            Ok(document)
        })
    }
}

/// Convert one spaCy token; `start` is the sentence offset within the doc
fn convert_token(token: &Bound<'_, PyAny>, id: usize, start: usize) -> PyResult<Token> {
    let attr = |name: &str| -> PyResult<String> { token.getattr(name)?.extract() };

    let head_i: usize = token.getattr("head")?.getattr("i")?.extract()?;
    // Heads outside the sentence do not occur in spaCy parses; fall back to self
    let head = head_i.checked_sub(start).unwrap_or(id);
    let morph = token.getattr("morph")?.str()?.to_string();

    let mut converted = Token::new(
        id,
        &attr("text")?,
        &attr("lemma_")?,
        &attr("pos_")?,
        &attr("tag_")?,
        &attr("dep_")?,
    )
    .with_head(head)
    .with_feats(Features::parse(&morph))
    .with_ent_type(&attr("ent_type_")?);
    converted.space_after = !attr("whitespace_")?.is_empty();

    Ok(converted)
}
