//! Run configuration
//!
//! A `Config` is assembled once at start-up (JSON file, then command-line
//! overrides) and passed by reference to everything that needs it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MODEL: &str = "en_core_web_lg";
pub const ACADEMIC_MARKER: &str = "text_acad";
pub const UNIFIED_FILE_NAME: &str = "unified_data.csv";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How timexy encodes normalized time expressions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KbIdType {
    #[default]
    Timex3,
    Timestamp,
}

impl KbIdType {
    pub fn as_str(self) -> &'static str {
        match self {
            KbIdType::Timex3 => "timex3",
            KbIdType::Timestamp => "timestamp",
        }
    }
}

/// Options handed to the timexy pipeline component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimexyOptions {
    pub kb_id_type: KbIdType,
    pub label: String,
    pub overwrite: bool,
}

impl Default for TimexyOptions {
    fn default() -> Self {
        Self {
            kb_id_type: KbIdType::Timex3,
            label: "timexy".to_string(),
            overwrite: false,
        }
    }
}

/// Everything a run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub read_dir: PathBuf,
    pub write_dir: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    pub unify: bool,
    /// Documents per output file
    pub batch_size: usize,
    /// Input files are `*.{input_extension}` in `read_dir`
    pub input_extension: String,
    /// File stems containing this are treated as academic text
    pub academic_marker: String,
    pub model: String,
    /// Run `spacy.cli.download` for the model before loading it
    pub download_model: bool,
    pub timexy: TimexyOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_dir: PathBuf::from("."),
            write_dir: PathBuf::from("."),
            cache_dir: None,
            use_cache: false,
            unify: false,
            batch_size: DEFAULT_BATCH_SIZE,
            input_extension: "txt".to_string(),
            academic_marker: ACADEMIC_MARKER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            download_model: false,
            timexy: TimexyOptions::default(),
        }
    }
}

impl Config {
    /// Load from a JSON file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".to_string()));
        }
        if self.use_cache && self.cache_dir.is_none() {
            return Err(ConfigError::Invalid(
                "use_cache requires cache_dir".to_string(),
            ));
        }
        if self.input_extension.is_empty() {
            return Err(ConfigError::Invalid(
                "input_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache directory, if caching is switched on
    pub fn cache(&self) -> Option<&Path> {
        if self.use_cache {
            self.cache_dir.as_deref()
        } else {
            None
        }
    }

    pub fn is_academic(&self, fname: &str) -> bool {
        !self.academic_marker.is_empty() && fname.contains(&self.academic_marker)
    }

    pub fn unified_path(&self) -> PathBuf {
        self.write_dir.join(UNIFIED_FILE_NAME)
    }
}
