//! Fetching, debouncing and mutations for list views.
//!
//! Builds on `listview-query` and adds everything that talks to the outside
//! world.
//!
//! # Architecture
//!
//! - **Source**: [`Fetcher`], [`ItemDeleter`] and [`BulkDeleter`] abstract
//!   the endpoint; a [`RequestMapper`] shapes the request parameters
//! - **Debounce**: [`SearchDebouncer`] settles raw search text after a quiet
//!   period
//! - **Response**: [`normalize`] reduces the accepted envelope shapes to rows
//!   and counts
//! - **Coordinator**: [`FetchCoordinator`] is the fetch state machine; it
//!   tickets every fetch and drops stale completions
//! - **Controller**: [`TableController`] wires it all together behind a
//!   single intent dispatcher
//!
//! ## Update cycle
//!
//! 1. **Intent**: the user changes search, filters, sort, page or selection
//! 2. **Derive**: the canonical query is recomputed from the query state
//! 3. **Compare**: an equal canonical query stops here
//! 4. **Mirror**: the address bar is rewritten in place
//! 5. **Fetch**: a ticketed fetch runs; only the newest ticket is applied
//!
//! # Example
//!
//! ```
//! use listview_engine::source::mock::StaticFetcher;
//! use listview_engine::{TableConfig, TableController};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let fetcher = Arc::new(StaticFetcher::new(json!({ "items": [], "total": 0 })));
//! let table: TableController<Value> =
//!     TableController::builder(TableConfig::default(), fetcher)
//!         .build()
//!         .unwrap();
//!
//! table.initialize(None).await;
//! table.set_filter("status", "active").await;
//! assert_eq!(table.href().await, "/?status=active");
//! # });
//! ```

mod controller;
mod coordinator;
mod debounce;
mod error;
mod mutation;
pub mod notify;
mod response;
pub mod source;

pub use controller::{
    InitialData, TableController, TableControllerBuilder, TableIntent, TableView,
};
pub use coordinator::{Completion, FetchCoordinator, FetchPhase, FetchResult, FetchTicket};
pub use debounce::{SearchDebouncer, DEFAULT_QUIET_PERIOD};
pub use error::{ListViewError, ListViewResult, SourceError, SourceResult};
pub use mutation::{resolve_selection, MutationOutcome};
pub use notify::{Notification, Notifier, TracingNotifier};
pub use response::{normalize, NormalizedPage, ResponseShape};
pub use source::{BulkDeleter, CanonicalMapper, Fetcher, ItemDeleter, RequestMapper, TableRow};

pub use listview_query::{
    AddressBar, CanonicalQuery, PageSizeParam, QueryState, RowSelection, SelectionKeying,
    TableConfig,
};
pub use listview_types::{FilterMap, FilterValue, ItemId, PageSizes, Pagination, SortDescriptor};
