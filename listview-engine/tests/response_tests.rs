use listview_engine::{normalize, NormalizedPage, ResponseShape};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Listing {
    id: u64,
    title: String,
}

// ── Paginated envelope ───────────────────────────────────────────

#[test]
fn paginated_with_count_and_page_size() {
    let body = json!({
        "data": [{"id": 1}, {"id": 2}],
        "pagination": {"count": 42, "page_size": 20, "page": 1}
    });
    let page: NormalizedPage<Value> = normalize(body).unwrap();

    assert_eq!(page.shape, ResponseShape::Paginated);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_count, 42);
    assert_eq!(page.reported_page_size, Some(20));
}

#[test]
fn paginated_without_count_falls_back_to_row_count() {
    let body = json!({"data": [{"id": 1}, {"id": 2}, {"id": 3}]});
    let page: NormalizedPage<Value> = normalize(body).unwrap();

    assert_eq!(page.shape, ResponseShape::Paginated);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.reported_page_size, None);
}

#[test]
fn zero_page_size_is_not_reported() {
    let body = json!({"data": [], "pagination": {"count": 0, "page_size": 0}});
    let page: NormalizedPage<Value> = normalize(body).unwrap();
    assert_eq!(page.reported_page_size, None);
}

#[test]
fn paginated_wins_over_items_total() {
    let body = json!({
        "data": [{"id": 1}],
        "items": [{"id": 7}, {"id": 8}],
        "total": 2
    });
    let page: NormalizedPage<Value> = normalize(body).unwrap();
    assert_eq!(page.shape, ResponseShape::Paginated);
    assert_eq!(page.items, vec![json!({"id": 1})]);
}

// ── Items/total envelope ─────────────────────────────────────────

#[test]
fn items_total_envelope() {
    let body = json!({
        "items": [
            {"id": 1, "title": "Villa Aurora"},
            {"id": 2, "title": "Casa Blanca"}
        ],
        "total": 7
    });
    let page: NormalizedPage<Listing> = normalize(body).unwrap();

    assert_eq!(page.shape, ResponseShape::ItemsTotal);
    assert_eq!(page.total_count, 7);
    assert_eq!(
        page.items[0],
        Listing {
            id: 1,
            title: "Villa Aurora".into()
        }
    );
}

#[test]
fn items_without_total_is_unrecognized() {
    let body = json!({"items": [{"id": 1}]});
    let page: NormalizedPage<Value> = normalize(body).unwrap();
    assert_eq!(page.shape, ResponseShape::Unrecognized);
    assert!(page.items.is_empty());
}

// ── Unrecognized and malformed ───────────────────────────────────

#[test]
fn unrecognized_shapes_normalize_to_empty() {
    for body in [
        json!(null),
        json!([{"id": 1}]),
        json!({"results": []}),
        json!({"data": {"id": 1}}),
    ] {
        let page: NormalizedPage<Value> = normalize(body).unwrap();
        assert_eq!(page.shape, ResponseShape::Unrecognized);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
    }
}

#[test]
fn rows_that_do_not_decode_are_an_error() {
    let body = json!({"items": [{"id": "not-a-number"}], "total": 1});
    let result = normalize::<Listing>(body);
    assert!(result.is_err());
}
