//! Error types for the evaluation pipeline

use std::fmt;

/// Errors raised while decomposing a SQL string into clauses.
///
/// The batch runner recovers `MalformedQuery` into a zeroed record; it never
/// crosses the `run` boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlEvalError {
    /// The query contains no recognizable top-level SELECT keyword.
    MalformedQuery { message: String },
}

impl fmt::Display for SqlEvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlEvalError::MalformedQuery { message } => {
                write!(f, "malformed query: {}", message)
            }
        }
    }
}

impl std::error::Error for SqlEvalError {}

/// Result alias for evaluation-pipeline operations.
pub type SqlEvalResult<T> = Result<T, SqlEvalError>;
