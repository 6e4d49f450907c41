//! Fetch coordination: the fetch state machine without I/O.
//!
//! The coordinator hands out a ticket for every fetch it starts and only
//! accepts the completion that carries the newest ticket. Completions for
//! older tickets are stale and dropped, whatever order the network returns
//! them in. The controller performs the actual calls.

use crate::error::{ListViewError, SourceResult};
use crate::response::{normalize, ResponseShape};
use listview_types::{PageSizes, Pagination};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Where the fetch cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch for the newest query is outstanding.
    Loading,
    /// The newest fetch succeeded (or seed data was supplied).
    Settled,
    /// The newest fetch failed.
    Failed,
}

/// The rows currently on display. Replaced wholesale on every settled fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_count: u64,
}

impl<T> FetchResult<T> {
    /// Builds a result, deriving the page count from `page_size`.
    pub fn new(items: Vec<T>, total_count: u64, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            page_count: Pagination::new(0, page_size).page_count(total_count),
        }
    }

    /// No rows.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page_count: 0,
        }
    }
}

impl<T> Default for FetchResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Identifies one issued fetch. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What happened to a completed fetch.
#[derive(Debug)]
pub enum Completion {
    /// A newer fetch was issued since; the result was dropped.
    Stale,
    /// The result is now on display.
    Settled {
        shape: ResponseShape,
        /// Set when the server used a different (snapped) page size than
        /// was requested; the caller should adopt it.
        adopted_page_size: Option<u32>,
    },
    /// The newest fetch failed; the display was reset to empty.
    Failed(ListViewError),
}

/// The fetch state machine for one table.
#[derive(Debug)]
pub struct FetchCoordinator<T> {
    phase: FetchPhase,
    result: FetchResult<T>,
    issued: u64,
}

impl<T: DeserializeOwned> FetchCoordinator<T> {
    /// Creates an idle coordinator with no rows.
    pub fn new() -> Self {
        Self {
            phase: FetchPhase::Idle,
            result: FetchResult::empty(),
            issued: 0,
        }
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    pub fn result(&self) -> &FetchResult<T> {
        &self.result
    }

    /// The newest ticket handed out, if any.
    pub fn latest(&self) -> Option<FetchTicket> {
        (self.issued > 0).then_some(FetchTicket(self.issued))
    }

    /// Whether `ticket` is the newest one.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Starts a fetch. Any outstanding fetch becomes stale.
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        self.phase = FetchPhase::Loading;
        FetchTicket(self.issued)
    }

    /// Shows rows supplied up front, without fetching. Any outstanding
    /// fetch becomes stale.
    pub fn seed(&mut self, items: Vec<T>, total_count: u64, page_size: u32) {
        self.issued += 1;
        self.result = FetchResult::new(items, total_count, page_size);
        self.phase = FetchPhase::Settled;
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// `requested_page_size` is the page size the fetch asked for; a
    /// differing server-reported size is snapped to `page_sizes`, used for
    /// the page count and returned for adoption.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: SourceResult<Value>,
        requested_page_size: u32,
        page_sizes: &PageSizes,
    ) -> Completion {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.0,
                latest = self.issued,
                ok = outcome.is_ok(),
                "discarding stale fetch result"
            );
            return Completion::Stale;
        }

        let page = match outcome
            .map_err(ListViewError::from)
            .and_then(|body| normalize::<T>(body).map_err(ListViewError::from))
        {
            Ok(page) => page,
            Err(err) => {
                self.result = FetchResult::empty();
                self.phase = FetchPhase::Failed;
                return Completion::Failed(err);
            }
        };

        if page.shape == ResponseShape::Unrecognized {
            warn!(ticket = ticket.0, "unrecognized response shape; showing no rows");
        }

        let effective_page_size = page
            .reported_page_size
            .map(|reported| page_sizes.snap(reported))
            .unwrap_or(requested_page_size);
        let adopted_page_size =
            (effective_page_size != requested_page_size).then_some(effective_page_size);

        self.result = FetchResult::new(page.items, page.total_count, effective_page_size);
        self.phase = FetchPhase::Settled;
        Completion::Settled {
            shape: page.shape,
            adopted_page_size,
        }
    }
}

impl<T: DeserializeOwned> Default for FetchCoordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}
