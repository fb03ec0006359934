//! Core generator traits and types
//!
//! This module defines the error type, the generator trait and the code
//! formatting trait shared by the code generators.

use linkml_core::prelude::*;
use thiserror::Error;

/// Result type for generator operations
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur during code generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The schema is inconsistent: unresolvable type chain, unknown range,
    /// inheritance that cannot be linearized, conflicting collection keys,
    /// or an unrecognized metadata mode
    #[error("Schema integrity error: {0}")]
    SchemaIntegrity(String),

    /// Caller-supplied configuration cannot be honoured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generated source failed the post-generation compile check
    #[error("Generated code does not compile: {message}")]
    Compilation {
        /// What the check found
        message: String,
        /// 1-based line in the generated source, if known
        line: Option<usize>,
    },

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `LinkML` core error
    #[error("LinkML error: {0}")]
    LinkML(LinkMLError),
}

impl GeneratorError {
    /// Create a schema integrity error
    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::SchemaIntegrity(message.into())
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Is this a fatal schema integrity problem?
    #[must_use]
    pub fn is_schema_integrity(&self) -> bool {
        matches!(self, Self::SchemaIntegrity(_))
    }
}

impl From<LinkMLError> for GeneratorError {
    fn from(err: LinkMLError) -> Self {
        match err {
            LinkMLError::SchemaIntegrityError { .. }
            | LinkMLError::ElementNotFound { .. }
            | LinkMLError::IfAbsentError { .. } => Self::SchemaIntegrity(err.to_string()),
            LinkMLError::ConfigError(message) => Self::Configuration(message),
            other => Self::LinkML(other),
        }
    }
}

impl From<GeneratorError> for LinkMLError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::SchemaIntegrity(message) => LinkMLError::integrity(message),
            GeneratorError::Configuration(message) => LinkMLError::config(message),
            GeneratorError::Io(e) => LinkMLError::IoError(e),
            GeneratorError::LinkML(e) => e,
            other => LinkMLError::service(other.to_string()),
        }
    }
}

/// Indentation style for generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndentStyle {
    /// Use spaces for indentation
    Spaces(usize),
    /// Use tabs for indentation
    Tabs,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self::Spaces(4)
    }
}

impl IndentStyle {
    /// Get single indentation string
    #[must_use]
    pub fn single(&self) -> String {
        match self {
            Self::Spaces(n) => " ".repeat(*n),
            Self::Tabs => "\t".to_string(),
        }
    }
}

/// Core trait for synchronous code generators
pub trait Generator {
    /// Get generator name
    fn name(&self) -> &str;

    /// Get generator description
    fn description(&self) -> &str;

    /// Generate code from a schema
    ///
    /// # Errors
    /// Returns an error if the schema is invalid or code generation fails
    fn generate(&self, schema: &SchemaDefinition) -> Result<String>;

    /// Get the file extension for generated files
    fn get_file_extension(&self) -> &str;

    /// Get the default filename for generated files
    fn get_default_filename(&self) -> &str;

    /// Validate schema before generation
    ///
    /// # Errors
    /// Returns an error if the schema validation fails
    fn validate_schema(&self, schema: &SchemaDefinition) -> Result<()>;
}

/// Trait for code formatting utilities
pub trait CodeFormatter {
    /// Get formatter name
    fn name(&self) -> &str;

    /// Format code
    ///
    /// # Errors
    /// Returns an error if code formatting fails
    fn format_code(&self, code: &str) -> GeneratorResult<String>;

    /// Escape string for the target language
    fn escape_string(&self, s: &str) -> String {
        s.to_string()
    }
}
