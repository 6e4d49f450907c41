//! Table controller: the reactive pipeline and all of its I/O.
//!
//! Every user intent goes through one dispatcher: mutate the query state,
//! derive the canonical query, compare it by value with the last one acted
//! on, and only on a real change mirror it into the address bar and start a
//! fetch. Fetches run on spawned tasks; their results come back through the
//! [`FetchCoordinator`], which drops anything stale.

use crate::coordinator::{Completion, FetchCoordinator, FetchPhase, FetchTicket};
use crate::debounce::SearchDebouncer;
use crate::error::{ListViewError, ListViewResult, SourceError, SourceResult};
use crate::mutation::{resolve_selection, MutationOutcome};
use crate::notify::{Notifier, TracingNotifier};
use crate::source::{BulkDeleter, CanonicalMapper, Fetcher, ItemDeleter, RequestMapper, TableRow};
use listview_query::{
    AddressBar, CanonicalQuery, QueryState, RowSelection, TableConfig, UrlSynchronizer,
};
use listview_types::{FilterMap, FilterValue, ItemId, Pagination, SortDescriptor};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Something the user did to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableIntent {
    SetPageIndex(u32),
    SetPageSize(u32),
    SetSort(Option<SortDescriptor>),
    /// Cycle a column through ascending, descending and unsorted.
    ToggleSort(String),
    /// Raw keystrokes; debounced before they reach the query.
    SetSearch(String),
    SetFilter { key: String, value: FilterValue },
    ClearFilter(String),
    ClearFilters,
    SelectRow { key: String, selected: bool },
    ToggleRow(String),
    SetSelection(RowSelection),
    ClearSelection,
    /// Fetch again even though the query is unchanged.
    Refetch,
}

/// Rows available before the first fetch (e.g. rendered server-side).
#[derive(Debug, Clone)]
pub struct InitialData<T> {
    pub items: Vec<T>,
    /// Defaults to the number of items.
    pub total_count: Option<u64>,
}

impl<T> InitialData<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_count: None,
        }
    }

    pub fn with_total(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }
}

/// A read-only snapshot of everything a renderer needs.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    pub data: Vec<T>,
    pub total_items: u64,
    pub page_count: u64,
    pub is_loading: bool,
    pub phase: FetchPhase,
    pub pagination: Pagination,
    pub sort: Option<SortDescriptor>,
    pub filters: FilterMap,
    /// Search text as typed.
    pub raw_search: String,
    /// Search text the current query uses.
    pub search: String,
    pub selection: RowSelection,
    /// How many explicit refetches have been requested.
    pub refetch_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Active,
    Disposed,
}

/// The last (query, refetch) pair a fetch was issued for.
#[derive(Debug, Clone, PartialEq)]
struct Emitted {
    query: CanonicalQuery,
    nonce: u64,
}

struct PendingFetch {
    ticket: FetchTicket,
    request: Value,
    page_size: u32,
}

struct Inner<T> {
    query: QueryState,
    coordinator: FetchCoordinator<T>,
    emitted: Option<Emitted>,
    refetch_nonce: u64,
    lifecycle: Lifecycle,
    debouncer: SearchDebouncer,
}

struct Shared<T> {
    config: TableConfig,
    url: UrlSynchronizer,
    fetcher: Arc<dyn Fetcher>,
    mapper: Arc<dyn RequestMapper>,
    item_deleter: Option<Arc<dyn ItemDeleter>>,
    bulk_deleter: Option<Arc<dyn BulkDeleter>>,
    notifier: Arc<dyn Notifier>,
    address_bar: Option<Arc<dyn AddressBar>>,
    inner: Mutex<Inner<T>>,
    revision: watch::Sender<u64>,
}

/// Builds a [`TableController`].
pub struct TableControllerBuilder<T> {
    config: TableConfig,
    fetcher: Arc<dyn Fetcher>,
    mapper: Arc<dyn RequestMapper>,
    item_deleter: Option<Arc<dyn ItemDeleter>>,
    bulk_deleter: Option<Arc<dyn BulkDeleter>>,
    notifier: Arc<dyn Notifier>,
    address_bar: Option<Arc<dyn AddressBar>>,
    hydrate: bool,
    _row: PhantomData<fn() -> T>,
}

impl<T: TableRow> TableControllerBuilder<T> {
    /// Sets the request mapper. Defaults to [`CanonicalMapper`].
    pub fn mapper(mut self, mapper: Arc<dyn RequestMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Enables single-row deletes.
    pub fn item_deleter(mut self, deleter: Arc<dyn ItemDeleter>) -> Self {
        self.item_deleter = Some(deleter);
        self
    }

    /// Enables bulk deletes.
    pub fn bulk_deleter(mut self, deleter: Arc<dyn BulkDeleter>) -> Self {
        self.bulk_deleter = Some(deleter);
        self
    }

    /// Sets the notification channel. Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Mirrors the canonical query into `bar`.
    pub fn address_bar(mut self, bar: Arc<dyn AddressBar>) -> Self {
        self.address_bar = Some(bar);
        self
    }

    /// Seeds the query state from the address bar's current URL.
    pub fn hydrate_from_address_bar(mut self) -> Self {
        self.hydrate = true;
        self
    }

    /// Validates the configuration and builds the controller. The
    /// controller does nothing until [`TableController::initialize`].
    pub fn build(self) -> ListViewResult<TableController<T>> {
        let config = self.config.validate()?;
        let query = match (&self.address_bar, self.hydrate) {
            (Some(bar), true) => {
                let current = bar.current();
                let query_string = current
                    .split_once('?')
                    .map(|(_, qs)| qs.split('#').next().unwrap_or_default())
                    .unwrap_or_default();
                QueryState::from_query_string(query_string, &config)
            }
            _ => QueryState::new(&config),
        };
        let debouncer = SearchDebouncer::new(Duration::from_millis(config.debounce_ms));
        let (revision, _) = watch::channel(0);

        Ok(TableController {
            shared: Arc::new(Shared {
                url: UrlSynchronizer::new(&config),
                config,
                fetcher: self.fetcher,
                mapper: self.mapper,
                item_deleter: self.item_deleter,
                bulk_deleter: self.bulk_deleter,
                notifier: self.notifier,
                address_bar: self.address_bar,
                inner: Mutex::new(Inner {
                    query,
                    coordinator: FetchCoordinator::new(),
                    emitted: None,
                    refetch_nonce: 0,
                    lifecycle: Lifecycle::Created,
                    debouncer,
                }),
                revision,
            }),
        })
    }
}

/// Orchestrates one table: query state, address bar, fetches and deletes.
///
/// Cloning yields another handle to the same table.
pub struct TableController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for TableController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: TableRow> TableController<T> {
    /// Starts building a controller around a required fetcher.
    pub fn builder(config: TableConfig, fetcher: Arc<dyn Fetcher>) -> TableControllerBuilder<T> {
        TableControllerBuilder {
            config,
            fetcher,
            mapper: Arc::new(CanonicalMapper),
            item_deleter: None,
            bulk_deleter: None,
            notifier: Arc::new(TracingNotifier),
            address_bar: None,
            hydrate: false,
            _row: PhantomData,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Activates the controller. With seed data the rows are shown as
    /// settled and nothing is fetched; without, the first fetch starts.
    pub async fn initialize(&self, seed: Option<InitialData<T>>) {
        self.shared.initialize(seed).await;
    }

    /// Cancels pending search emissions and ignores any fetch still in
    /// flight. Further intents are ignored.
    pub async fn dispose(&self) {
        self.shared.dispose().await;
    }

    // ── Intents ──────────────────────────────────────────────────

    /// Applies an intent.
    pub async fn dispatch(&self, intent: TableIntent) {
        self.shared.dispatch(intent).await;
    }

    pub async fn set_page_index(&self, page_index: u32) {
        self.dispatch(TableIntent::SetPageIndex(page_index)).await;
    }

    pub async fn set_page_size(&self, page_size: u32) {
        self.dispatch(TableIntent::SetPageSize(page_size)).await;
    }

    pub async fn set_sort(&self, sort: Option<SortDescriptor>) {
        self.dispatch(TableIntent::SetSort(sort)).await;
    }

    pub async fn toggle_sort(&self, field: impl Into<String>) {
        self.dispatch(TableIntent::ToggleSort(field.into())).await;
    }

    pub async fn set_search(&self, text: impl Into<String>) {
        self.dispatch(TableIntent::SetSearch(text.into())).await;
    }

    pub async fn set_filter(&self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.dispatch(TableIntent::SetFilter {
            key: key.into(),
            value: value.into(),
        })
        .await;
    }

    pub async fn clear_filter(&self, key: impl Into<String>) {
        self.dispatch(TableIntent::ClearFilter(key.into())).await;
    }

    pub async fn clear_filters(&self) {
        self.dispatch(TableIntent::ClearFilters).await;
    }

    pub async fn select_row(&self, key: impl Into<String>, selected: bool) {
        self.dispatch(TableIntent::SelectRow {
            key: key.into(),
            selected,
        })
        .await;
    }

    pub async fn toggle_row(&self, key: impl Into<String>) {
        self.dispatch(TableIntent::ToggleRow(key.into())).await;
    }

    pub async fn set_selection(&self, selection: RowSelection) {
        self.dispatch(TableIntent::SetSelection(selection)).await;
    }

    pub async fn clear_selection(&self) {
        self.dispatch(TableIntent::ClearSelection).await;
    }

    /// Fetches again with the current query.
    pub async fn refetch(&self) {
        self.dispatch(TableIntent::Refetch).await;
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Deletes one row, then refetches.
    pub async fn delete_item(&self, id: impl Into<ItemId>) -> MutationOutcome {
        self.shared.delete_item(id.into()).await
    }

    /// Deletes `ids`, or the selected rows when `ids` is `None`, then
    /// refetches.
    pub async fn delete_selected(&self, ids: Option<Vec<ItemId>>) -> MutationOutcome {
        self.shared.delete_selected(ids).await
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Snapshot of the current table.
    pub async fn view(&self) -> TableView<T> {
        let inner = self.shared.inner.lock().await;
        let result = inner.coordinator.result();
        TableView {
            data: result.items.clone(),
            total_items: result.total_count,
            page_count: result.page_count,
            is_loading: inner.coordinator.is_loading(),
            phase: inner.coordinator.phase(),
            pagination: inner.query.pagination(),
            sort: inner.query.sort().cloned(),
            filters: inner.query.filters().clone(),
            raw_search: inner.query.raw_search().to_string(),
            search: inner.query.settled_search().to_string(),
            selection: inner.query.selection().clone(),
            refetch_count: inner.refetch_nonce,
        }
    }

    /// Copy of the query state.
    pub async fn query_state(&self) -> QueryState {
        self.shared.inner.lock().await.query.clone()
    }

    /// The canonical query for the current state.
    pub async fn canonical_query(&self) -> CanonicalQuery {
        self.shared.inner.lock().await.query.canonical()
    }

    /// Address-bar URL for the current state, at the path the address bar
    /// currently shows (`/` without one).
    pub async fn href(&self) -> String {
        let query = self.canonical_query().await;
        let current = self
            .shared
            .address_bar
            .as_ref()
            .map_or_else(|| "/".to_string(), |bar| bar.current());
        self.shared.url.href(&current, &query)
    }

    /// Receives a new revision number whenever the view changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn config(&self) -> &TableConfig {
        &self.shared.config
    }
}

impl<T: TableRow> Shared<T> {
    async fn initialize(self: &Arc<Self>, seed: Option<InitialData<T>>) {
        let pending = {
            let mut inner = self.inner.lock().await;
            match inner.lifecycle {
                Lifecycle::Created => {}
                Lifecycle::Active => {
                    warn!("table controller initialized twice; ignoring");
                    return;
                }
                Lifecycle::Disposed => return,
            }
            inner.lifecycle = Lifecycle::Active;

            match seed {
                Some(seed) => {
                    let total = seed.total_count.unwrap_or(seed.items.len() as u64);
                    info!(rows = seed.items.len(), total, "table initialized with seed data");
                    let page_size = inner.query.page_size();
                    inner.coordinator.seed(seed.items, total, page_size);
                    let canonical = inner.query.canonical();
                    self.mirror(&canonical);
                    inner.emitted = Some(Emitted {
                        query: canonical,
                        nonce: inner.refetch_nonce,
                    });
                    None
                }
                None => {
                    info!("table initialized; loading first page");
                    self.reconcile(&mut inner)
                }
            }
        };
        self.after_change(pending);
    }

    async fn dispose(&self) {
        let mut inner = self.inner.lock().await;
        if inner.lifecycle == Lifecycle::Disposed {
            return;
        }
        inner.lifecycle = Lifecycle::Disposed;
        inner.debouncer.cancel();
        drop(inner);
        debug!("table controller disposed");
        self.publish();
    }

    async fn dispatch(self: &Arc<Self>, intent: TableIntent) {
        let pending = {
            let mut inner = self.inner.lock().await;
            if inner.lifecycle == Lifecycle::Disposed {
                return;
            }
            match intent {
                TableIntent::SetSearch(text) => {
                    inner.query.set_raw_search(text.clone());
                    let weak = Arc::downgrade(self);
                    inner.debouncer.push(text, move |settled| async move {
                        if let Some(shared) = weak.upgrade() {
                            shared.settle_search(settled).await;
                        }
                    });
                    None
                }
                TableIntent::Refetch => {
                    inner.refetch_nonce += 1;
                    self.reconcile(&mut inner)
                }
                other => {
                    apply_intent(&mut inner.query, other);
                    self.reconcile(&mut inner)
                }
            }
        };
        self.after_change(pending);
    }

    async fn settle_search(self: &Arc<Self>, text: String) {
        let pending = {
            let mut inner = self.inner.lock().await;
            if inner.lifecycle == Lifecycle::Disposed {
                return;
            }
            debug!(search = %text, "search settled");
            inner.query.settle_search(text);
            self.reconcile(&mut inner)
        };
        self.after_change(pending);
    }

    /// Compares the canonical query with the last one acted on; on a change
    /// (or a new refetch request) mirrors the URL and starts a fetch.
    fn reconcile(&self, inner: &mut Inner<T>) -> Option<PendingFetch> {
        if inner.lifecycle != Lifecycle::Active {
            return None;
        }
        let canonical = inner.query.canonical();
        let nonce = inner.refetch_nonce;
        if let Some(previous) = &inner.emitted {
            if previous.query == canonical && previous.nonce == nonce {
                return None;
            }
            if previous.query != canonical && self.config.clear_selection_on_query_change {
                inner.query.clear_selection();
            }
        }

        self.mirror(&canonical);
        let request = self.mapper.map(
            canonical.pagination(),
            canonical.sort.as_ref(),
            &canonical.filters,
            canonical.search.as_deref(),
        );
        let ticket = inner.coordinator.begin();
        debug!(ticket = ticket.sequence(), request = %request, "issuing fetch");
        let page_size = canonical.limit;
        inner.emitted = Some(Emitted {
            query: canonical,
            nonce,
        });
        Some(PendingFetch {
            ticket,
            request,
            page_size,
        })
    }

    fn mirror(&self, canonical: &CanonicalQuery) {
        if let Some(bar) = &self.address_bar {
            self.url.sync(bar.as_ref(), canonical);
        }
    }

    fn after_change(self: &Arc<Self>, pending: Option<PendingFetch>) {
        if let Some(pending) = pending {
            self.spawn_fetch(pending);
        }
        self.publish();
    }

    fn spawn_fetch(self: &Arc<Self>, pending: PendingFetch) {
        let weak = Arc::downgrade(self);
        let fetcher = Arc::clone(&self.fetcher);
        tokio::spawn(async move {
            let outcome = fetcher.fetch(pending.request).await;
            if let Some(shared) = weak.upgrade() {
                shared
                    .finish_fetch(pending.ticket, pending.page_size, outcome)
                    .await;
            }
        });
    }

    async fn finish_fetch(&self, ticket: FetchTicket, page_size: u32, outcome: SourceResult<Value>) {
        let failure = {
            let mut inner = self.inner.lock().await;
            if inner.lifecycle == Lifecycle::Disposed {
                return;
            }
            let page_sizes = inner.query.page_sizes().clone();
            match inner
                .coordinator
                .complete(ticket, outcome, page_size, &page_sizes)
            {
                Completion::Stale => return,
                Completion::Settled {
                    adopted_page_size, ..
                } => {
                    if let Some(size) = adopted_page_size {
                        self.adopt_page_size(&mut inner, size);
                    }
                    None
                }
                Completion::Failed(err) => Some(err),
            }
        };
        self.publish();
        if let Some(err) = failure {
            warn!(ticket = ticket.sequence(), error = %err, "fetch failed");
            self.notifier.notify_error(&err, "data load error");
        }
    }

    /// The server is authoritative on page size. The rows on display already
    /// reflect it, so the query is updated without fetching again.
    fn adopt_page_size(&self, inner: &mut Inner<T>, size: u32) {
        if !inner.query.adopt_page_size(size) {
            return;
        }
        info!(page_size = size, "adopting server page size");
        let canonical = inner.query.canonical();
        self.mirror(&canonical);
        inner.emitted = Some(Emitted {
            query: canonical,
            nonce: inner.refetch_nonce,
        });
    }

    async fn delete_item(self: &Arc<Self>, id: ItemId) -> MutationOutcome {
        let Some(deleter) = self.item_deleter.clone() else {
            return self.not_configured("deleting an item");
        };
        match deleter.delete_item(&id).await {
            Ok(()) => {
                info!(id = %id, "item deleted");
                self.after_delete().await;
                self.notifier.notify_success("Item deleted");
                MutationOutcome::Deleted(1)
            }
            Err(err) => self.delete_failed(err),
        }
    }

    async fn delete_selected(self: &Arc<Self>, ids: Option<Vec<ItemId>>) -> MutationOutcome {
        let Some(deleter) = self.bulk_deleter.clone() else {
            return self.not_configured("deleting selected items");
        };
        let ids = match ids {
            Some(ids) => ids,
            None => {
                let inner = self.inner.lock().await;
                resolve_selection(
                    inner.query.selection(),
                    &inner.coordinator.result().items,
                    self.config.selection_keying,
                )
            }
        };
        if ids.is_empty() {
            self.notifier.notify_info("No items selected");
            return MutationOutcome::NothingSelected;
        }
        match deleter.delete_items(&ids).await {
            Ok(()) => {
                info!(count = ids.len(), "items deleted");
                self.after_delete().await;
                self.notifier
                    .notify_success(&format!("{} items deleted", ids.len()));
                MutationOutcome::Deleted(ids.len())
            }
            Err(err) => self.delete_failed(err),
        }
    }

    async fn after_delete(self: &Arc<Self>) {
        let pending = {
            let mut inner = self.inner.lock().await;
            inner.query.clear_selection();
            inner.refetch_nonce += 1;
            self.reconcile(&mut inner)
        };
        self.after_change(pending);
    }

    fn not_configured(&self, operation: &'static str) -> MutationOutcome {
        let err = ListViewError::NotConfigured { operation };
        warn!(error = %err, "mutation skipped");
        self.notifier.notify_error(&err, "configuration error");
        MutationOutcome::NotConfigured
    }

    fn delete_failed(&self, err: SourceError) -> MutationOutcome {
        let err = ListViewError::from(err);
        warn!(error = %err, "delete failed");
        self.notifier.notify_error(&err, "delete failed");
        MutationOutcome::Failed(err.to_string())
    }

    fn publish(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

fn apply_intent(query: &mut QueryState, intent: TableIntent) {
    match intent {
        TableIntent::SetPageIndex(page_index) => {
            query.set_page_index(page_index);
        }
        TableIntent::SetPageSize(page_size) => {
            query.set_page_size(page_size);
        }
        TableIntent::SetSort(sort) => {
            query.set_sort(sort);
        }
        TableIntent::ToggleSort(field) => {
            query.toggle_sort(&field);
        }
        TableIntent::SetFilter { key, value } => {
            query.set_filter(key, value);
        }
        TableIntent::ClearFilter(key) => {
            query.clear_filter(&key);
        }
        TableIntent::ClearFilters => {
            query.clear_filters();
        }
        TableIntent::SelectRow { key, selected } => query.select_row(key, selected),
        TableIntent::ToggleRow(key) => query.toggle_row(key),
        TableIntent::SetSelection(selection) => query.set_selection(selection),
        TableIntent::ClearSelection => {
            query.clear_selection();
        }
        TableIntent::SetSearch(_) | TableIntent::Refetch => {}
    }
}
