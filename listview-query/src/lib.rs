//! Query state and canonical query derivation for list views.
//!
//! A table view reconciles several independently changing inputs (search
//! text, filters, sort, pagination, row selection) into one request. This
//! crate holds the synchronous half of that pipeline:
//!
//! - **State**: [`QueryState`], the single owner of everything the user can
//!   change, plus [`RowSelection`]
//! - **Compose**: [`compose`] derives a [`CanonicalQuery`] that compares by
//!   value, so "nothing really changed" is detectable
//! - **Url**: [`UrlSynchronizer`] mirrors a canonical query into the address
//!   bar at its current path (replace, never push) and [`QueryState::from_query_string`] reads it
//!   back on load
//!
//! # Example
//!
//! ```
//! use listview_query::{QueryState, TableConfig, UrlSynchronizer};
//! use listview_types::SortDescriptor;
//!
//! let config = TableConfig::default();
//! let mut state = QueryState::new(&config);
//! state.set_filter("status", "active");
//! state.set_sort(Some(SortDescriptor::desc("created_at")));
//!
//! let url = UrlSynchronizer::new(&config);
//! assert_eq!(
//!     url.href("/listings", &state.canonical()),
//!     "/listings?ordering=-created_at&status=active"
//! );
//! ```

pub mod address;
mod compose;
mod config;
mod error;
mod state;
mod url;

pub use address::AddressBar;
pub use compose::{compose, CanonicalQuery};
pub use config::{PageSizeParam, SelectionKeying, TableConfig};
pub use error::{QueryError, QueryResult};
pub use state::{QueryState, RowSelection};
pub use url::{parse_query_string, url_path, UrlSynchronizer};
