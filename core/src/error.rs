//! Error types for `LinkML` schema handling

use thiserror::Error;

/// Main error type for schema-level operations
#[derive(Error, Debug)]
pub enum LinkMLError {
    /// Schema parsing errors
    #[error("Failed to parse schema: {message}")]
    ParseError {
        /// Error message
        message: String,
        /// Location in schema if available
        location: Option<String>,
    },

    /// The schema is internally inconsistent (dangling references, cycles,
    /// unresolvable types)
    #[error("Schema integrity error: {message}")]
    SchemaIntegrityError {
        /// Error message
        message: String,
        /// Schema element that failed
        element: Option<String>,
    },

    /// A schema element was looked up by name and does not exist
    #[error("{kind} '{name}' not found in schema")]
    ElementNotFound {
        /// Element kind (class, slot, type, enum)
        kind: &'static str,
        /// Element name
        name: String,
    },

    /// An `ifabsent` expression could not be parsed
    #[error("Invalid ifabsent expression '{expression}': {reason}")]
    IfAbsentError {
        /// Raw expression text
        expression: String,
        /// Reason for failure
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Service integration errors
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Generic errors with context
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for schema-level operations
pub type Result<T> = std::result::Result<T, LinkMLError>;

impl LinkMLError {
    /// Create a new parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: None,
        }
    }

    /// Create a new parse error with location
    #[must_use]
    pub fn parse_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Create a new schema integrity error
    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::SchemaIntegrityError {
            message: message.into(),
            element: None,
        }
    }

    /// Create a schema integrity error attached to a named element
    #[must_use]
    pub fn integrity_at(message: impl Into<String>, element: impl Into<String>) -> Self {
        Self::SchemaIntegrityError {
            message: message.into(),
            element: Some(element.into()),
        }
    }

    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::ElementNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a new ifabsent error
    #[must_use]
    pub fn ifabsent(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IfAbsentError {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a new service error
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::ServiceError(message.into())
    }

    /// Create a generic error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            source: None,
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError(message.into())
    }

    /// Create a generic error with source
    #[must_use]
    pub fn other_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for LinkMLError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for LinkMLError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<regex::Error> for LinkMLError {
    fn from(err: regex::Error) -> Self {
        Self::config(format!("invalid pattern: {err}"))
    }
}

impl From<anyhow::Error> for LinkMLError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            message: err.to_string(),
            source: Some(Box::new(std::io::Error::other(err))),
        }
    }
}
