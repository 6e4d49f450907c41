//! Canonical query composition.

use listview_types::{FilterMap, Pagination, SortDescriptor};
use serde_json::{Map, Value};

/// The single request descriptor derived from all table inputs.
///
/// Two states that differ only in values meaning "not set" compose to equal
/// queries, so equality is the controller's test for "refetch needed".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalQuery {
    /// One-based page number.
    pub page: u32,
    pub limit: u32,
    /// Trimmed, non-empty search text.
    pub search: Option<String>,
    pub sort: Option<SortDescriptor>,
    /// Active filters only.
    pub filters: FilterMap,
}

impl CanonicalQuery {
    /// The `ordering` parameter, if sorted.
    #[must_use]
    pub fn ordering(&self) -> Option<String> {
        self.sort.as_ref().map(SortDescriptor::ordering)
    }

    /// Zero-based pagination.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page.saturating_sub(1), self.limit)
    }

    /// Flat JSON object: `{page, limit, search?, ordering?, ...filters}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.filters {
            map.insert(key.clone(), value.to_json());
        }
        map.insert("page".into(), Value::from(self.page));
        map.insert("limit".into(), Value::from(self.limit));
        if let Some(search) = &self.search {
            map.insert("search".into(), Value::String(search.clone()));
        }
        if let Some(ordering) = self.ordering() {
            map.insert("ordering".into(), Value::String(ordering));
        }
        Value::Object(map)
    }
}

/// Derives the canonical query. Pure and deterministic: equal inputs give
/// equal outputs.
///
/// Search is trimmed and dropped when empty. Filters that are null, empty,
/// `"all"` or an empty list are dropped.
pub fn compose(
    pagination: Pagination,
    sort: Option<&SortDescriptor>,
    debounced_search: &str,
    filters: &FilterMap,
) -> CanonicalQuery {
    let search = debounced_search.trim();
    CanonicalQuery {
        page: pagination.page_number(),
        limit: pagination.page_size,
        search: (!search.is_empty()).then(|| search.to_string()),
        sort: sort.cloned(),
        filters: filters
            .iter()
            .filter(|(_, value)| !value.is_cleared())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}
