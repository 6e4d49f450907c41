//! In-memory listings backend for the list-view demo.
//!
//! Answers canonical query requests the way a paginated REST endpoint would:
//! filtering, searching and ordering happen server-side, and the page size
//! is capped.

use async_trait::async_trait;
use listview_engine::{BulkDeleter, Fetcher, ItemDeleter, ItemId, SourceError, SourceResult, TableRow};
use listview_types::SortDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Largest page the store serves.
pub const MAX_PAGE_SIZE: u32 = 50;

const KINDS: [&str; 4] = ["villa", "apartment", "cottage", "loft"];
const PLACES: [&str; 6] = ["Aurora", "Blu", "Del Mar", "Rosa", "Serena", "Vista"];
const STATUSES: [&str; 3] = ["active", "draft", "archived"];

/// Keys of a request that are not filters.
const CONTROL_KEYS: [&str; 5] = ["page", "limit", "size", "search", "ordering"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub kind: String,
    pub status: String,
    pub price: u64,
    /// Unix seconds.
    pub created_at: u64,
}

impl Listing {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "title" => Some(self.title.clone()),
            "kind" => Some(self.kind.clone()),
            "status" => Some(self.status.clone()),
            "price" => Some(self.price.to_string()),
            "created_at" => Some(self.created_at.to_string()),
            _ => None,
        }
    }

    fn compare(&self, other: &Self, field: &str) -> Option<Ordering> {
        match field {
            "title" => Some(self.title.cmp(&other.title)),
            "kind" => Some(self.kind.cmp(&other.kind)),
            "status" => Some(self.status.cmp(&other.status)),
            "price" => Some(self.price.cmp(&other.price)),
            "created_at" => Some(self.created_at.cmp(&other.created_at)),
            _ => None,
        }
    }
}

impl TableRow for Listing {
    fn row_id(&self) -> Option<ItemId> {
        Some(self.id.into())
    }
}

/// Generates `count` listings with varied kinds, statuses and prices.
pub fn generate_listings(count: usize) -> Vec<Listing> {
    (0..count)
        .map(|n| {
            let kind = KINDS[n % KINDS.len()];
            let place = PLACES[(n / KINDS.len()) % PLACES.len()];
            let mut title = format!("{} {place}", capitalize(kind));
            if n >= KINDS.len() * PLACES.len() {
                title.push_str(&format!(" {}", n / (KINDS.len() * PLACES.len()) + 1));
            }
            Listing {
                id: Uuid::now_v7(),
                title,
                kind: kind.to_string(),
                status: STATUSES[n % STATUSES.len()].to_string(),
                price: 80_000 + (n as u64 * 37_500) % 900_000,
                created_at: 1_700_000_000 + n as u64 * 86_400,
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How long to wait for a fetch against a store with `latency` to settle.
/// Saturates instead of overflowing for huge latencies.
pub fn settle_timeout(latency: Duration) -> Duration {
    latency.saturating_mul(4).saturating_add(Duration::from_secs(2))
}

/// A listings endpoint backed by memory.
pub struct ListingStore {
    listings: RwLock<Vec<Listing>>,
    latency: Duration,
}

impl ListingStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            latency: Duration::ZERO,
        }
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Answers a request in the paginated envelope.
    pub async fn query(&self, request: &Value) -> SourceResult<Value> {
        let params = request
            .as_object()
            .ok_or_else(|| SourceError::Status {
                code: 400,
                message: "request must be an object".into(),
            })?;

        let page = params.get("page").and_then(Value::as_u64).unwrap_or(1).max(1);
        let requested = params
            .get("limit")
            .or_else(|| params.get("size"))
            .and_then(Value::as_u64)
            .unwrap_or(10);
        let page_size = u32::try_from(requested).unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let search = params
            .get("search")
            .and_then(Value::as_str)
            .map(str::to_lowercase);
        let sort = match params.get("ordering").and_then(Value::as_str) {
            Some(ordering) => Some(SortDescriptor::parse_ordering(ordering).map_err(|e| {
                SourceError::Status {
                    code: 400,
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let listings = self.listings.read().await;
        let mut matched: Vec<&Listing> = listings
            .iter()
            .filter(|listing| {
                search
                    .as_deref()
                    .is_none_or(|needle| listing.title.to_lowercase().contains(needle))
            })
            .filter(|listing| {
                params
                    .iter()
                    .filter(|(key, _)| !CONTROL_KEYS.contains(&key.as_str()))
                    .all(|(key, expected)| matches_filter(listing, key, expected))
            })
            .collect();

        if let Some(sort) = &sort {
            if matched
                .first()
                .is_some_and(|l| l.compare(l, &sort.field).is_none())
            {
                return Err(SourceError::Status {
                    code: 400,
                    message: format!("cannot order by {}", sort.field),
                });
            }
            matched.sort_by(|a, b| {
                let ord = a.compare(b, &sort.field).unwrap_or(Ordering::Equal);
                if sort.descending { ord.reverse() } else { ord }
            });
        }

        let count = matched.len();
        let offset = (page as usize - 1).saturating_mul(page_size as usize);
        let data: Vec<&Listing> = matched.into_iter().skip(offset).take(page_size as usize).collect();
        debug!(page, page_size, count, returned = data.len(), "served listings page");

        Ok(json!({
            "data": data,
            "pagination": {
                "count": count,
                "page": page,
                "page_size": page_size,
            }
        }))
    }

    async fn remove(&self, ids: &[ItemId]) -> SourceResult<()> {
        let mut listings = self.listings.write().await;
        if let Some(missing) = ids
            .iter()
            .find(|id| !listings.iter().any(|l| l.id.to_string() == id.as_str()))
        {
            return Err(SourceError::Rejected(format!("no listing {missing}")));
        }
        listings.retain(|l| !ids.iter().any(|id| id.as_str() == l.id.to_string()));
        Ok(())
    }
}

fn matches_filter(listing: &Listing, key: &str, expected: &Value) -> bool {
    let Some(actual) = listing.field(key) else {
        return false;
    };
    match expected {
        Value::String(s) => actual == *s,
        Value::Array(options) => options
            .iter()
            .filter_map(Value::as_str)
            .any(|option| option == actual),
        Value::Bool(b) => actual == b.to_string(),
        Value::Number(n) => actual == n.to_string(),
        _ => true,
    }
}

#[async_trait]
impl Fetcher for ListingStore {
    async fn fetch(&self, request: Value) -> SourceResult<Value> {
        self.simulate_latency().await;
        self.query(&request).await
    }
}

#[async_trait]
impl ItemDeleter for ListingStore {
    async fn delete_item(&self, id: &ItemId) -> SourceResult<()> {
        self.simulate_latency().await;
        self.remove(std::slice::from_ref(id)).await
    }
}

#[async_trait]
impl BulkDeleter for ListingStore {
    async fn delete_items(&self, ids: &[ItemId]) -> SourceResult<()> {
        self.simulate_latency().await;
        self.remove(ids).await
    }
}
