//! Sort descriptors.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single-column sort. Rendered on the wire as `field` (ascending) or
/// `-field` (descending).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub field: String,
    pub descending: bool,
}

impl SortDescriptor {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Returns the `ordering` parameter value.
    #[must_use]
    pub fn ordering(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }

    /// Parses an `ordering` parameter value.
    pub fn parse_ordering(ordering: &str) -> crate::Result<Self> {
        let trimmed = ordering.trim();
        let (field, descending) = match trimmed.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        if field.is_empty() || field.starts_with('-') {
            return Err(Error::InvalidOrdering(ordering.to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ordering())
    }
}

impl FromStr for SortDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_ordering(s)
    }
}
