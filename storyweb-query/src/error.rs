//! Query building error types.

use thiserror::Error;

/// Result type for query building.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A field name that would break the selection grammar.
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
}
