//! Pagination and the allowed page-size set.

use crate::Error;
use serde::{Deserialize, Serialize};

/// Zero-based page position plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: u32,
    pub page_size: u32,
}

impl Pagination {
    /// Creates a pagination value.
    #[must_use]
    pub const fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// One-based page number as sent to servers.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_index.saturating_add(1)
    }

    /// Number of pages needed to show `total` rows. Zero when the page size
    /// is zero.
    #[must_use]
    pub fn page_count(&self, total: u64) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            total.div_ceil(u64::from(self.page_size))
        }
    }
}

/// The page sizes a table offers. Always non-empty, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct PageSizes(Vec<u32>);

impl PageSizes {
    /// Builds the set. Zero entries are dropped.
    pub fn new(sizes: impl IntoIterator<Item = u32>) -> crate::Result<Self> {
        let mut sizes: Vec<u32> = sizes.into_iter().filter(|s| *s > 0).collect();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            return Err(Error::EmptyPageSizes);
        }
        Ok(Self(sizes))
    }

    /// Returns the allowed sizes in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Whether `size` is an allowed page size.
    #[must_use]
    pub fn contains(&self, size: u32) -> bool {
        self.0.binary_search(&size).is_ok()
    }

    /// Coerces `requested` to the nearest allowed size. Ties go to the
    /// smaller size.
    #[must_use]
    pub fn snap(&self, requested: u32) -> u32 {
        self.0
            .iter()
            .copied()
            .min_by_key(|size| (size.abs_diff(requested), *size))
            .unwrap_or(requested)
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self(vec![10, 20, 30, 50])
    }
}

impl TryFrom<Vec<u32>> for PageSizes {
    type Error = Error;

    fn try_from(sizes: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(sizes)
    }
}

impl From<PageSizes> for Vec<u32> {
    fn from(sizes: PageSizes) -> Self {
        sizes.0
    }
}
