//! Error types for the query layer.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while building query state.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid table configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid value type.
    #[error(transparent)]
    Types(#[from] listview_types::Error),
}
