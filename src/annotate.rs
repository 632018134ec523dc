//! Seam to the external annotation pipeline
//!
//! Tagging, parsing and entity recognition are not done here. An
//! [`Annotator`] turns one line of raw text into an annotated [`Document`].

use crate::tree::Document;

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("no annotation pipeline available ({0})")]
    Unavailable(String),

    #[error("annotation pipeline failed: {0}")]
    Pipeline(String),
}

/// Produces annotated documents from raw text
pub trait Annotator {
    fn annotate(&mut self, text: &str) -> Result<Document, AnnotateError>;
}

impl<A: Annotator + ?Sized> Annotator for Box<A> {
    fn annotate(&mut self, text: &str) -> Result<Document, AnnotateError> {
        (**self).annotate(text)
    }
}

/// Stand-in when no pipeline is compiled in; only cached files can be read
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl Annotator for Unavailable {
    fn annotate(&mut self, _text: &str) -> Result<Document, AnnotateError> {
        Err(AnnotateError::Unavailable(
            "built without the `spacy` feature; only cached documents can be scanned".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable() {
        let mut annotator: Box<dyn Annotator> = Box::new(Unavailable);
        let err = annotator.annotate("Hello.").unwrap_err();
        assert!(matches!(err, AnnotateError::Unavailable(_)));
    }
}
