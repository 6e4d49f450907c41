//! Filter values.
//!
//! A table exposes an open-ended set of filters (status, city, agent, ...).
//! Each filter carries one of a handful of scalar shapes or a list of
//! strings for multi-select filters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The value a select control uses to mean "no filter".
pub const CLEARED_SENTINEL: &str = "all";

/// Filters keyed by filter name. Ordered so that serialisation is stable.
pub type FilterMap = BTreeMap<String, FilterValue>;

/// The value of a single filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Explicitly unset.
    #[default]
    Null,
    Bool(bool),
    Number(i64),
    Text(String),
    /// Multi-select; serialised as repeated query keys.
    List(Vec<String>),
}

impl FilterValue {
    /// Returns true if this value means "not set": null, the empty string,
    /// the `"all"` sentinel, or an empty list.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty() || s == CLEARED_SENTINEL,
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Returns the query-string values for this filter, one per repeated key.
    #[must_use]
    pub fn query_values(&self) -> Vec<String> {
        match self {
            Self::Null => Vec::new(),
            Self::Bool(b) => vec![b.to_string()],
            Self::Number(n) => vec![n.to_string()],
            Self::Text(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::from(*n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::from(items.clone()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
