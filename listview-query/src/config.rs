//! Table configuration.

use crate::error::{QueryError, QueryResult};
use listview_types::PageSizes;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which query-string key carries the page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSizeParam {
    #[default]
    Limit,
    Size,
}

impl PageSizeParam {
    /// The query-string key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Size => "size",
        }
    }
}

/// How row-selection keys map to rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKeying {
    /// Keys are positional indices into the current page ("0", "1", ...).
    #[default]
    Position,
    /// Keys are row identifiers.
    Identifier,
}

/// Configuration for one table instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Path the query string is appended to. `None` keeps whatever path the
    /// address bar currently shows.
    pub path: Option<String>,
    /// Page size used when nothing else is requested. Omitted from URLs.
    pub default_page_size: u32,
    /// Page sizes the table offers.
    pub allowed_page_sizes: PageSizes,
    /// Search quiet period (ms).
    pub debounce_ms: u64,
    /// URL key for the page size.
    pub page_size_param: PageSizeParam,
    /// How selection keys are interpreted by bulk operations.
    pub selection_keying: SelectionKeying,
    /// Filter keys accepted when hydrating from a URL. Empty accepts every
    /// key that is not a reserved parameter.
    pub filter_keys: Vec<String>,
    /// Filter keys that hold several values. They hydrate from a URL as a
    /// list even when only one value is present.
    pub list_filter_keys: Vec<String>,
    /// Drop the row selection whenever the canonical query changes.
    pub clear_selection_on_query_change: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_page_size: 10,
            allowed_page_sizes: PageSizes::default(),
            debounce_ms: 300,
            page_size_param: PageSizeParam::Limit,
            selection_keying: SelectionKeying::Position,
            filter_keys: Vec::new(),
            list_filter_keys: Vec::new(),
            clear_selection_on_query_change: true,
        }
    }
}

impl TableConfig {
    /// Checks the configuration, snapping a default page size that is not
    /// an allowed size.
    pub fn validate(mut self) -> QueryResult<Self> {
        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return Err(QueryError::Config(format!(
                    "path must start with '/': {path:?}"
                )));
            }
            if path.contains(['?', '#']) {
                return Err(QueryError::Config(format!(
                    "path must not carry a query or fragment: {path:?}"
                )));
            }
        }
        if !self.allowed_page_sizes.contains(self.default_page_size) {
            let snapped = self.allowed_page_sizes.snap(self.default_page_size);
            warn!(
                requested = self.default_page_size,
                snapped, "default page size is not an allowed size"
            );
            self.default_page_size = snapped;
        }
        Ok(self)
    }

    /// Whether `key` may be hydrated as a filter.
    #[must_use]
    pub fn accepts_filter(&self, key: &str) -> bool {
        self.filter_keys.is_empty() || self.filter_keys.iter().any(|k| k == key)
    }

    /// Whether `key` always hydrates as a list.
    #[must_use]
    pub fn is_list_filter(&self, key: &str) -> bool {
        self.list_filter_keys.iter().any(|k| k == key)
    }
}
