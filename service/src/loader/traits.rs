//! Common traits and types for data loaders

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for data loading operations
#[derive(Debug, Error)]
pub enum LoaderError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source text could not be parsed as RDF or JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Remote source could not be retrieved
    #[error("Failed to fetch {url}: {message}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Transport or status failure
        message: String,
    },

    /// Document could not be framed into a single object
    #[error("Framing error: {0}")]
    Framing(String),

    /// Framed object does not fit the target structure
    #[error("Structural error: {0}")]
    Structural(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for loader operations
pub type LoaderResult<T> = std::result::Result<T, LoaderError>;

impl From<LoaderError> for linkml_core::LinkMLError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::Io(io_err) => linkml_core::LinkMLError::IoError(io_err),
            LoaderError::Parse(msg) => linkml_core::LinkMLError::parse(msg),
            LoaderError::Configuration(msg) => linkml_core::LinkMLError::config(msg),
            LoaderError::Structural(msg) => linkml_core::LinkMLError::serialization(msg),
            other @ (LoaderError::Fetch { .. } | LoaderError::Framing(_)) => {
                linkml_core::LinkMLError::service(other.to_string())
            }
        }
    }
}

/// A generated model class data can be loaded into
///
/// `class_name` is the `LinkML` class name the type was generated from; it
/// is compared with the `@type` of loaded documents.
pub trait LinkMLClass: DeserializeOwned {
    /// `LinkML` class name of this type
    fn class_name() -> &'static str;
}

/// Represents a loaded data instance
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataInstance {
    /// Name of the LinkML class this instance represents
    pub class_name: String,

    /// The actual data fields and values for this instance
    pub data: IndexMap<String, JsonValue>,

    /// Optional instance identifier
    pub id: Option<String>,

    /// Metadata about the instance
    pub metadata: IndexMap<String, String>,
}

/// Where loaded data came from
///
/// Callers may pass one in to have it filled in while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// Directory relative sources are resolved against
    pub base_path: Option<PathBuf>,
    /// File path or URL that was read
    pub source_file: Option<String>,
    /// Size of the source in bytes
    pub source_file_size: Option<u64>,
    /// Last modification time of a file source
    pub source_file_date: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Metadata entries recorded on a [`DataInstance`]
    #[must_use]
    pub fn to_metadata(&self) -> IndexMap<String, String> {
        let mut metadata = IndexMap::new();
        if let Some(base) = &self.base_path {
            metadata.insert("base_path".to_string(), base.display().to_string());
        }
        if let Some(source) = &self.source_file {
            metadata.insert("source_file".to_string(), source.clone());
        }
        if let Some(size) = self.source_file_size {
            metadata.insert("source_file_size".to_string(), size.to_string());
        }
        if let Some(date) = self.source_file_date {
            metadata.insert("source_file_date".to_string(), date.to_rfc3339());
        }
        metadata
    }
}
