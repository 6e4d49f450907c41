//! Data-source abstraction.
//!
//! The controller knows nothing about endpoints. A table is wired to a
//! [`Fetcher`] (required), a [`RequestMapper`] that turns internal query
//! shapes into whatever the endpoint expects, and optional deleters.

use crate::error::SourceResult;
use async_trait::async_trait;
use listview_query::compose;
use listview_types::{FilterMap, ItemId, Pagination, SortDescriptor};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A row the table can display and delete.
pub trait TableRow: DeserializeOwned + Clone + Send + Sync + 'static {
    /// The id used for delete calls, if the row has one.
    fn row_id(&self) -> Option<ItemId>;
}

impl TableRow for Value {
    fn row_id(&self) -> Option<ItemId> {
        self.get("id").and_then(ItemId::from_json)
    }
}

/// Loads one page of rows. Any error is treated as a fetch failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches with endpoint-specific parameters produced by a
    /// [`RequestMapper`]. The response may take any of the accepted shapes.
    async fn fetch(&self, request: Value) -> SourceResult<Value>;
}

/// Deletes a single row.
#[async_trait]
pub trait ItemDeleter: Send + Sync {
    async fn delete_item(&self, id: &ItemId) -> SourceResult<()>;
}

/// Deletes several rows in one call.
#[async_trait]
pub trait BulkDeleter: Send + Sync {
    async fn delete_items(&self, ids: &[ItemId]) -> SourceResult<()>;
}

/// Pure mapping from internal query shapes to endpoint parameters.
pub trait RequestMapper: Send + Sync {
    fn map(
        &self,
        pagination: Pagination,
        sort: Option<&SortDescriptor>,
        filters: &FilterMap,
        search: Option<&str>,
    ) -> Value;
}

impl<F> RequestMapper for F
where
    F: Fn(Pagination, Option<&SortDescriptor>, &FilterMap, Option<&str>) -> Value + Send + Sync,
{
    fn map(
        &self,
        pagination: Pagination,
        sort: Option<&SortDescriptor>,
        filters: &FilterMap,
        search: Option<&str>,
    ) -> Value {
        self(pagination, sort, filters, search)
    }
}

/// Sends the canonical query as-is:
/// `{page, limit, search?, ordering?, ...filters}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalMapper;

impl RequestMapper for CanonicalMapper {
    fn map(
        &self,
        pagination: Pagination,
        sort: Option<&SortDescriptor>,
        filters: &FilterMap,
        search: Option<&str>,
    ) -> Value {
        compose(pagination, sort, search.unwrap_or_default(), filters).to_json()
    }
}

/// Mock data sources for testing.
pub mod mock {
    use super::*;
    use crate::error::SourceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::{oneshot, Notify};

    struct Gate {
        request: Value,
        reply: Option<oneshot::Sender<SourceResult<Value>>>,
    }

    /// A fetcher whose requests stay outstanding until the test resolves
    /// them, in any order.
    #[derive(Default)]
    pub struct GatedFetcher {
        gates: Mutex<Vec<Gate>>,
        arrived: Notify,
    }

    impl GatedFetcher {
        /// Creates a fetcher with no outstanding requests.
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of requests received so far.
        pub fn request_count(&self) -> usize {
            self.gates.lock().unwrap().len()
        }

        /// The request parameters of the `index`th fetch.
        pub fn request(&self, index: usize) -> Option<Value> {
            self.gates.lock().unwrap().get(index).map(|g| g.request.clone())
        }

        /// Completes the `index`th fetch. Returns false if it was already
        /// resolved or never issued.
        pub fn resolve(&self, index: usize, result: SourceResult<Value>) -> bool {
            let reply = self
                .gates
                .lock()
                .unwrap()
                .get_mut(index)
                .and_then(|g| g.reply.take());
            match reply {
                Some(tx) => tx.send(result).is_ok(),
                None => false,
            }
        }

        /// Waits until at least `count` requests have arrived.
        pub async fn wait_for_requests(&self, count: usize) {
            loop {
                let notified = self.arrived.notified();
                if self.request_count() >= count {
                    return;
                }
                notified.await;
            }
        }
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn fetch(&self, request: Value) -> SourceResult<Value> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push(Gate {
                request,
                reply: Some(tx),
            });
            self.arrived.notify_waiters();
            rx.await
                .unwrap_or_else(|_| Err(SourceError::Network("request abandoned".into())))
        }
    }

    /// A fetcher that answers every request with the same response.
    pub struct StaticFetcher {
        response: SourceResult<Value>,
        calls: AtomicUsize,
        requests: Mutex<Vec<Value>>,
    }

    impl StaticFetcher {
        /// Always answers with `response`.
        pub fn new(response: Value) -> Self {
            Self::with_result(Ok(response))
        }

        /// Always fails with `error`.
        pub fn failing(error: SourceError) -> Self {
            Self::with_result(Err(error))
        }

        fn with_result(response: SourceResult<Value>) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Number of fetches so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Every request received, oldest first.
        pub fn requests(&self) -> Vec<Value> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, request: Value) -> SourceResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    /// Records delete calls. Implements both deleter traits.
    #[derive(Default)]
    pub struct RecordingDeleter {
        deleted: Mutex<Vec<Vec<ItemId>>>,
        fail_with: Option<SourceError>,
    }

    impl RecordingDeleter {
        /// A deleter whose calls succeed.
        pub fn new() -> Self {
            Self::default()
        }

        /// A deleter whose calls fail with `error`.
        pub fn failing(error: SourceError) -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                fail_with: Some(error),
            }
        }

        /// Every call's ids, oldest first.
        pub fn calls(&self) -> Vec<Vec<ItemId>> {
            self.deleted.lock().unwrap().clone()
        }

        fn record(&self, ids: Vec<ItemId>) -> SourceResult<()> {
            self.deleted.lock().unwrap().push(ids);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ItemDeleter for RecordingDeleter {
        async fn delete_item(&self, id: &ItemId) -> SourceResult<()> {
            self.record(vec![id.clone()])
        }
    }

    #[async_trait]
    impl BulkDeleter for RecordingDeleter {
        async fn delete_items(&self, ids: &[ItemId]) -> SourceResult<()> {
            self.record(ids.to_vec())
        }
    }
}
