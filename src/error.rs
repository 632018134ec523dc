//! Error types for the scanning pipeline

use std::path::PathBuf;

use crate::annotate::AnnotateError;
use crate::config::ConfigError;
use crate::conllu::ParseError;

/// Top-level error for a corpus run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache file {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("annotation failed: {0}")]
    Annotate(#[from] AnnotateError),

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize match data: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
