//! Core value types for the list-view controller.
//!
//! This crate defines the plain data shared by every layer of a table view:
//! - Row identifiers used by delete operations
//! - Filter values and the filter map
//! - Sort descriptors and their `ordering` wire form
//! - Pagination and the allowed page-size set
//!
//! Nothing here performs I/O or holds state beyond its own value.

mod filter;
mod ids;
mod page;
mod sort;

pub use filter::{FilterMap, FilterValue, CLEARED_SENTINEL};
pub use ids::ItemId;
pub use page::{PageSizes, Pagination};
pub use sort::SortDescriptor;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("allowed page sizes must not be empty")]
    EmptyPageSizes,

    #[error("invalid ordering: {0:?}")]
    InvalidOrdering(String),
}
