//! Error types for the engine layer.

use thiserror::Error;

/// Result type for engine operations.
pub type ListViewResult<T> = Result<T, ListViewError>;

/// Result type returned by data sources.
pub type SourceResult<T> = Result<T, SourceError>;

/// Failures reported by a data source (fetch or delete).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {code}: {message}")]
    Status { code: u16, message: String },

    /// The server refused the operation.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Timeout.
    #[error("operation timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the list-view engine.
#[derive(Debug, Error)]
pub enum ListViewError {
    /// A data-source call failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The response had a recognised shape but its rows did not decode.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A collaborator needed for the operation was not supplied.
    #[error("{operation} is not configured for this table")]
    NotConfigured { operation: &'static str },

    /// Invalid table configuration.
    #[error(transparent)]
    Config(#[from] listview_query::QueryError),
}
