//! Response normalisation.
//!
//! Endpoints answer in one of a few envelope shapes. Each shape has a
//! matcher; matchers are tried in order and the first hit wins. A body no
//! matcher recognises normalises to an empty page rather than an error.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Which envelope a response used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ data: [...], pagination: { count, page_size, ... } }`
    Paginated,
    /// `{ items: [...], total: n }`
    ItemsTotal,
    /// Anything else.
    Unrecognized,
}

/// A response reduced to rows and counts.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPage<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    /// Page size the server says it used, when it says so.
    pub reported_page_size: Option<u32>,
    pub shape: ResponseShape,
}

impl<T> NormalizedPage<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            reported_page_size: None,
            shape: ResponseShape::Unrecognized,
        }
    }
}

/// What a matcher found, before rows are decoded.
struct ShapeMatch {
    items_key: &'static str,
    total_count: u64,
    reported_page_size: Option<u32>,
    shape: ResponseShape,
}

type ShapeMatcher = fn(&Value) -> Option<ShapeMatch>;

const MATCHERS: [ShapeMatcher; 2] = [match_paginated, match_items_total];

fn match_paginated(body: &Value) -> Option<ShapeMatch> {
    let data = body.get("data")?.as_array()?;
    let pagination = body.get("pagination").filter(|p| p.is_object());
    let total_count = pagination
        .and_then(|p| p.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(data.len() as u64);
    let reported_page_size = pagination
        .and_then(|p| p.get("page_size"))
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0);
    Some(ShapeMatch {
        items_key: "data",
        total_count,
        reported_page_size,
        shape: ResponseShape::Paginated,
    })
}

fn match_items_total(body: &Value) -> Option<ShapeMatch> {
    body.get("items")?.as_array()?;
    let total_count = body.get("total")?.as_u64()?;
    Some(ShapeMatch {
        items_key: "items",
        total_count,
        reported_page_size: None,
        shape: ResponseShape::ItemsTotal,
    })
}

/// Normalises a response body.
///
/// Fails only when a recognised envelope carries rows that do not decode
/// into `T`.
pub fn normalize<T: DeserializeOwned>(mut body: Value) -> Result<NormalizedPage<T>, serde_json::Error> {
    let Some(found) = MATCHERS.iter().find_map(|matcher| matcher(&body)) else {
        return Ok(NormalizedPage::empty());
    };
    let rows = match body.get_mut(found.items_key).map(Value::take) {
        Some(Value::Array(rows)) => rows,
        _ => Vec::new(),
    };
    let items = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(NormalizedPage {
        items,
        total_count: found.total_count,
        reported_page_size: found.reported_page_size,
        shape: found.shape,
    })
}
