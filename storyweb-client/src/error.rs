//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while fetching and merging entities.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP client construction or protocol failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// The response is not JSON, or lacks the shape the merge step needs.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid key: {0}")]
    Key(#[from] storyweb_types::Error),

    #[error("invalid query: {0}")]
    Query(#[from] storyweb_query::QueryError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Network failures and non-2xx responses.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Http(_) | ClientError::Status { .. }
        )
    }

    /// Malformed or unexpectedly shaped responses.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ClientError::Decode(_) | ClientError::Serialization(_) | ClientError::Key(_)
        )
    }

    /// Returns the HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
