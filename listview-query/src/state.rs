//! Query state.
//!
//! [`QueryState`] is the one place a table's user-controlled inputs live.
//! Every mutator reports whether it changed anything and applies the page
//! reset rule: narrowing the result set (filter, search, sort or page size
//! change) always returns to the first page.

use crate::compose::{compose, CanonicalQuery};
use crate::config::TableConfig;
use crate::url::parse_query_string;
use listview_types::{FilterMap, FilterValue, PageSizes, Pagination, SortDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row selection, keyed by position or identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSelection(BTreeMap<String, bool>);

impl RowSelection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a row as selected or not.
    pub fn set(&mut self, key: impl Into<String>, selected: bool) {
        let key = key.into();
        if selected {
            self.0.insert(key, true);
        } else {
            self.0.remove(&key);
        }
    }

    /// Flips a row's selection.
    pub fn toggle(&mut self, key: impl Into<String>) {
        let key = key.into();
        let selected = self.is_selected(&key);
        self.set(key, !selected);
    }

    /// Whether a row is selected.
    #[must_use]
    pub fn is_selected(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Selected keys in key order.
    pub fn selected_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(key, _)| key.as_str())
    }

    /// Number of selected rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected_keys().count()
    }

    /// True if no row is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deselects everything. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.is_empty();
        self.0.clear();
        had_any
    }
}

impl<K: Into<String>> FromIterator<K> for RowSelection {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(|k| (k.into(), true)).collect())
    }
}

/// Everything the user can change about a table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pagination: Pagination,
    sort: Option<SortDescriptor>,
    raw_search: String,
    settled_search: String,
    filters: FilterMap,
    selection: RowSelection,
    page_sizes: PageSizes,
}

impl QueryState {
    /// Creates the default state for a table: first page, default page size,
    /// unsorted, no search, no filters.
    pub fn new(config: &TableConfig) -> Self {
        let page_sizes = config.allowed_page_sizes.clone();
        Self {
            pagination: Pagination::new(0, page_sizes.snap(config.default_page_size)),
            sort: None,
            raw_search: String::new(),
            settled_search: String::new(),
            filters: FilterMap::new(),
            selection: RowSelection::new(),
            page_sizes,
        }
    }

    /// Rebuilds state from an address-bar query string (with or without the
    /// leading `?`). Unparseable values fall back to defaults and the page
    /// size is snapped to the allowed set. The search is taken as settled.
    ///
    /// A URL carries no value types: a filter with one value comes back as
    /// [`FilterValue::Text`] (so `5` and `true` return as `"5"` and
    /// `"true"`), and a repeated key comes back as [`FilterValue::List`].
    /// Keys in [`TableConfig::list_filter_keys`] always come back as a list.
    pub fn from_query_string(query: &str, config: &TableConfig) -> Self {
        let mut state = Self::new(config);
        let size_key = config.page_size_param.key();
        let mut filters: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (key, value) in parse_query_string(query) {
            match key.as_str() {
                "page" => {
                    if let Ok(page) = value.parse::<u32>() {
                        state.pagination.page_index = page.saturating_sub(1);
                    }
                }
                "search" => {
                    state.raw_search = value.clone();
                    state.settled_search = value;
                }
                "ordering" => {
                    state.sort = SortDescriptor::parse_ordering(&value).ok();
                }
                k if k == size_key => {
                    if let Ok(size) = value.parse::<u32>() {
                        state.pagination.page_size = state.page_sizes.snap(size);
                    }
                }
                k if config.accepts_filter(k) => {
                    filters.entry(k.to_string()).or_default().push(value);
                }
                _ => {}
            }
        }

        state.filters = filters
            .into_iter()
            .map(|(key, mut values)| {
                let value = if values.len() == 1 && !config.is_list_filter(&key) {
                    FilterValue::Text(values.remove(0))
                } else {
                    FilterValue::List(values)
                };
                (key, value)
            })
            .collect();
        state
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn page_index(&self) -> u32 {
        self.pagination.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.pagination.page_size
    }

    pub fn page_sizes(&self) -> &PageSizes {
        &self.page_sizes
    }

    pub fn sort(&self) -> Option<&SortDescriptor> {
        self.sort.as_ref()
    }

    /// Search text exactly as typed.
    pub fn raw_search(&self) -> &str {
        &self.raw_search
    }

    /// Search text after the quiet period elapsed.
    pub fn settled_search(&self) -> &str {
        &self.settled_search
    }

    /// True while typed text has not yet settled.
    pub fn search_pending(&self) -> bool {
        self.raw_search != self.settled_search
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn selection(&self) -> &RowSelection {
        &self.selection
    }

    /// Derives the canonical query for this state.
    pub fn canonical(&self) -> CanonicalQuery {
        compose(
            self.pagination,
            self.sort.as_ref(),
            &self.settled_search,
            &self.filters,
        )
    }

    // ── Mutators ─────────────────────────────────────────────────

    /// Moves to a page.
    pub fn set_page_index(&mut self, page_index: u32) -> bool {
        let changed = self.pagination.page_index != page_index;
        self.pagination.page_index = page_index;
        changed
    }

    /// Changes the page size, snapped to the allowed set. Returns to the
    /// first page when the size changes.
    pub fn set_page_size(&mut self, requested: u32) -> bool {
        let size = self.page_sizes.snap(requested);
        if size == self.pagination.page_size {
            return false;
        }
        self.pagination = Pagination::new(0, size);
        true
    }

    /// Adopts the page size a server reports it actually used. Unlike
    /// [`set_page_size`](Self::set_page_size) this keeps the page index.
    pub fn adopt_page_size(&mut self, reported: u32) -> bool {
        let size = self.page_sizes.snap(reported);
        if size == self.pagination.page_size {
            return false;
        }
        self.pagination.page_size = size;
        true
    }

    /// Sets or clears the sort.
    pub fn set_sort(&mut self, sort: Option<SortDescriptor>) -> bool {
        if self.sort == sort {
            return false;
        }
        self.sort = sort;
        self.pagination.page_index = 0;
        true
    }

    /// Cycles a column through ascending, descending and unsorted.
    pub fn toggle_sort(&mut self, field: &str) -> bool {
        let next = match &self.sort {
            Some(current) if current.field == field && !current.descending => {
                Some(SortDescriptor::desc(field))
            }
            Some(current) if current.field == field => None,
            _ => Some(SortDescriptor::asc(field)),
        };
        self.set_sort(next)
    }

    /// Records typed search text. Does not affect the canonical query until
    /// [`settle_search`](Self::settle_search) is called.
    pub fn set_raw_search(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.raw_search == text {
            return false;
        }
        self.raw_search = text;
        true
    }

    /// Settles search text. Returns to the first page when the effective
    /// (trimmed) search changes.
    pub fn settle_search(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let effective_change = self.settled_search.trim() != text.trim();
        let changed = self.settled_search != text;
        self.settled_search = text;
        if effective_change {
            self.pagination.page_index = 0;
        }
        changed
    }

    /// Sets a filter. Returns to the first page when the effective filter
    /// changes; swapping one cleared value for another (absent, `""`,
    /// `"all"`) keeps the page.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> bool {
        let key = key.into();
        let value = value.into();
        let previous = self.filters.get(&key);
        if previous == Some(&value) {
            return false;
        }
        let was_cleared = previous.is_none_or(FilterValue::is_cleared);
        if !(was_cleared && value.is_cleared()) {
            self.pagination.page_index = 0;
        }
        self.filters.insert(key, value);
        true
    }

    /// Removes a filter. Returns to the first page if it was active.
    pub fn clear_filter(&mut self, key: &str) -> bool {
        let Some(previous) = self.filters.remove(key) else {
            return false;
        };
        if !previous.is_cleared() {
            self.pagination.page_index = 0;
        }
        true
    }

    /// Removes every filter. Returns to the first page if any was active.
    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        if self.filters.values().any(|value| !value.is_cleared()) {
            self.pagination.page_index = 0;
        }
        self.filters.clear();
        true
    }

    /// Marks a row as selected or not.
    pub fn select_row(&mut self, key: impl Into<String>, selected: bool) {
        self.selection.set(key, selected);
    }

    /// Flips a row's selection.
    pub fn toggle_row(&mut self, key: impl Into<String>) {
        self.selection.toggle(key);
    }

    /// Replaces the whole selection.
    pub fn set_selection(&mut self, selection: RowSelection) {
        self.selection = selection;
    }

    /// Deselects everything.
    pub fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }
}
