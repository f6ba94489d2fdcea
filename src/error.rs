//! Error types for the selection controller.

use std::path::PathBuf;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while binding or driving a select.
///
/// All of them are fatal and raised synchronously where detected. Item-level
/// conditions (clicking a disabled item, an empty collection) are not errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Repeat, source, mapping or disable expression does not parse.
    #[error("Expected expression in form of '_item_ in _collection_[ track by _id_]' but got '{expression}': {message}")]
    ExpressionSyntax { expression: String, message: String },

    /// The bound collection resolved to something that is not a sequence.
    #[error("Expected an array but got '{found}'")]
    InvalidSource { found: String },

    /// The bound value does not have the shape required by the select mode.
    #[error("Expected model value to be array but got '{found}'")]
    TypeMismatch { found: String },

    /// A collaborator structure the controller relies on is missing.
    #[error("Expected {expected} but got '{found}'")]
    Structural { expected: String, found: usize },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// File I/O error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON input.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The terminal front end could not start or stopped abnormally.
    #[error("Terminal UI error: {0}")]
    Terminal(String),
}

impl Error {
    /// Create an expression syntax error.
    pub fn syntax(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExpressionSyntax {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create an invalid source error for the offending value.
    pub fn invalid_source(found: &serde_json::Value) -> Self {
        Self::InvalidSource {
            found: found.to_string(),
        }
    }

    /// Create a type mismatch error for the offending bound value.
    pub fn type_mismatch(found: &serde_json::Value) -> Self {
        Self::TypeMismatch {
            found: found.to_string(),
        }
    }

    /// Create a structural error.
    pub fn structural(expected: impl Into<String>, found: usize) -> Self {
        Self::Structural {
            expected: expected.into(),
            found,
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
