//! Delete operations.
//!
//! Deletes are never optimistic: rows and selection stay as they are until
//! the data source confirms, and a confirmed delete is followed by exactly
//! one refetch.

use crate::source::TableRow;
use listview_query::{RowSelection, SelectionKeying};
use listview_types::ItemId;

/// Result of a delete request, after it has been reported to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The data source deleted this many rows.
    Deleted(usize),
    /// No ids resolved; nothing was sent.
    NothingSelected,
    /// No deleter was supplied; nothing was sent.
    NotConfigured,
    /// The data source rejected the delete. Carries the rendered error.
    Failed(String),
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// Maps the selection onto ids of the rows on display.
///
/// Positional keys index into `items`; keys that do not parse, fall out of
/// range, or point at a row without an id are dropped. Identifier keys are
/// kept only if a displayed row carries that id.
pub fn resolve_selection<T: TableRow>(
    selection: &RowSelection,
    items: &[T],
    keying: SelectionKeying,
) -> Vec<ItemId> {
    match keying {
        SelectionKeying::Position => {
            let mut indices: Vec<usize> = selection
                .selected_keys()
                .filter_map(|key| key.parse::<usize>().ok())
                .collect();
            indices.sort_unstable();
            indices
                .into_iter()
                .filter_map(|index| items.get(index))
                .filter_map(|row| row.row_id())
                .collect()
        }
        SelectionKeying::Identifier => {
            let displayed: Vec<ItemId> = items.iter().filter_map(|row| row.row_id()).collect();
            selection
                .selected_keys()
                .map(ItemId::from)
                .filter(|id| displayed.contains(id))
                .collect()
        }
    }
}
