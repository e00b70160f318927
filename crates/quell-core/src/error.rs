//! Error types for quell

use thiserror::Error;

/// The result type for quell operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, serializing, or transforming queries
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Structural violation in the query metadata (empty projection,
    /// duplicate join target, missing join condition, invalid modifiers)
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// No template is registered for the operator in the active dialect
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A constant value cannot be bound as a parameter
    #[error("Unsupported constant: {0}")]
    UnsupportedConstant(String),

    /// A group expression disagrees with the row shape or value types
    #[error("Projection mismatch: {0}")]
    ProjectionMismatch(String),

    /// The upstream row iterator failed; surfaced after the iterator is closed
    #[error("Row stream failed: {0}")]
    RowStreamFailed(String),
}

impl Error {
    /// Create a malformed-query error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedQuery(message.into())
    }

    /// Create an unsupported-operator error
    pub fn unsupported_operator(message: impl Into<String>) -> Self {
        Error::UnsupportedOperator(message.into())
    }

    /// Create an unsupported-constant error
    pub fn unsupported_constant(message: impl Into<String>) -> Self {
        Error::UnsupportedConstant(message.into())
    }

    /// Create a projection-mismatch error
    pub fn projection_mismatch(message: impl Into<String>) -> Self {
        Error::ProjectionMismatch(message.into())
    }

    /// Create a row-stream error
    pub fn row_stream(message: impl Into<String>) -> Self {
        Error::RowStreamFailed(message.into())
    }

    /// Coerce any error into the row-stream kind, preserving an existing one.
    pub fn into_row_stream(self) -> Self {
        match self {
            Error::RowStreamFailed(_) => self,
            other => Error::RowStreamFailed(other.to_string()),
        }
    }
}
