use listview_query::{QueryState, RowSelection, TableConfig};
use listview_types::{FilterValue, SortDescriptor};

fn state() -> QueryState {
    QueryState::new(&TableConfig::default())
}

fn state_on_page(page_index: u32) -> QueryState {
    let mut s = state();
    s.set_page_index(page_index);
    s
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn default_state() {
    let s = state();
    assert_eq!(s.page_index(), 0);
    assert_eq!(s.page_size(), 10);
    assert!(s.sort().is_none());
    assert_eq!(s.raw_search(), "");
    assert!(s.filters().is_empty());
    assert!(s.selection().is_empty());
}

#[test]
fn default_page_size_is_snapped() {
    let config = TableConfig {
        default_page_size: 37,
        ..Default::default()
    };
    assert_eq!(QueryState::new(&config).page_size(), 30);
}

// ── Page reset rule ──────────────────────────────────────────────

#[test]
fn filter_change_resets_page() {
    let mut s = state_on_page(3);
    assert!(s.set_filter("status", "active"));
    assert_eq!(s.page_index(), 0);
}

#[test]
fn filter_change_to_cleared_value_resets_page() {
    let mut s = state();
    s.set_filter("status", "active");
    s.set_page_index(3);
    assert!(s.set_filter("status", "all"));
    assert_eq!(s.page_index(), 0);
}

#[test]
fn same_filter_value_is_not_a_change() {
    let mut s = state();
    s.set_filter("status", "active");
    s.set_page_index(2);
    assert!(!s.set_filter("status", "active"));
    assert_eq!(s.page_index(), 2);
}

#[test]
fn clear_filter_resets_page() {
    let mut s = state();
    s.set_filter("city", "Lisbon");
    s.set_page_index(4);
    assert!(s.clear_filter("city"));
    assert_eq!(s.page_index(), 0);
    assert!(!s.clear_filter("city"));
}

#[test]
fn clear_filters_resets_page() {
    let mut s = state();
    s.set_filter("city", "Lisbon");
    s.set_filter("kind", "villa");
    s.set_page_index(1);
    assert!(s.clear_filters());
    assert!(s.filters().is_empty());
    assert_eq!(s.page_index(), 0);
    assert!(!s.clear_filters());
}

#[test]
fn cleared_value_on_absent_filter_keeps_page() {
    let mut s = state_on_page(3);
    let before = s.canonical();
    assert!(s.set_filter("status", "all"));
    assert_eq!(s.page_index(), 3);
    assert_eq!(s.canonical(), before);
}

#[test]
fn swapping_cleared_values_keeps_page() {
    let mut s = state();
    s.set_filter("status", "");
    s.set_page_index(2);
    assert!(s.set_filter("status", "all"));
    assert_eq!(s.page_index(), 2);
    assert!(s.clear_filter("status"));
    assert_eq!(s.page_index(), 2);
}

#[test]
fn clearing_only_inactive_filters_keeps_page() {
    let mut s = state();
    s.set_filter("status", "all");
    s.set_filter("tag", FilterValue::List(Vec::new()));
    s.set_page_index(5);
    assert!(s.clear_filters());
    assert!(s.filters().is_empty());
    assert_eq!(s.page_index(), 5);
}

#[test]
fn page_size_change_resets_page() {
    let mut s = state_on_page(3);
    assert!(s.set_page_size(20));
    assert_eq!(s.page_index(), 0);
    assert_eq!(s.page_size(), 20);
}

#[test]
fn page_size_is_snapped() {
    let mut s = state();
    assert!(s.set_page_size(37));
    assert_eq!(s.page_size(), 30);
}

#[test]
fn page_size_snapping_to_current_is_not_a_change() {
    let mut s = state_on_page(2);
    assert!(!s.set_page_size(11));
    assert_eq!(s.page_index(), 2);
}

#[test]
fn adopt_page_size_keeps_page() {
    let mut s = state_on_page(2);
    assert!(s.adopt_page_size(50));
    assert_eq!(s.page_size(), 50);
    assert_eq!(s.page_index(), 2);
}

#[test]
fn sort_change_resets_page() {
    let mut s = state_on_page(5);
    assert!(s.set_sort(Some(SortDescriptor::desc("created_at"))));
    assert_eq!(s.page_index(), 0);
    assert!(!s.set_sort(Some(SortDescriptor::desc("created_at"))));
}

#[test]
fn settle_search_resets_page() {
    let mut s = state_on_page(2);
    s.set_raw_search("villa");
    assert_eq!(s.page_index(), 2);
    assert!(s.search_pending());
    assert!(s.settle_search("villa"));
    assert_eq!(s.page_index(), 0);
    assert!(!s.search_pending());
}

#[test]
fn whitespace_only_search_change_keeps_page() {
    let mut s = state();
    s.settle_search("villa");
    s.set_page_index(2);
    s.settle_search("villa ");
    assert_eq!(s.page_index(), 2);
}

// ── Sort toggling ────────────────────────────────────────────────

#[test]
fn toggle_sort_cycles() {
    let mut s = state();
    s.toggle_sort("price");
    assert_eq!(s.sort(), Some(&SortDescriptor::asc("price")));
    s.toggle_sort("price");
    assert_eq!(s.sort(), Some(&SortDescriptor::desc("price")));
    s.toggle_sort("price");
    assert_eq!(s.sort(), None);
}

#[test]
fn toggle_other_column_starts_ascending() {
    let mut s = state();
    s.set_sort(Some(SortDescriptor::desc("price")));
    s.toggle_sort("title");
    assert_eq!(s.sort(), Some(&SortDescriptor::asc("title")));
}

// ── Selection ────────────────────────────────────────────────────

#[test]
fn selection_set_and_clear() {
    let mut s = state();
    s.select_row("0", true);
    s.select_row("2", true);
    s.select_row("1", false);
    assert_eq!(s.selection().len(), 2);
    assert_eq!(s.selection().selected_keys().collect::<Vec<_>>(), vec!["0", "2"]);
    assert!(s.clear_selection());
    assert!(s.selection().is_empty());
    assert!(!s.clear_selection());
}

#[test]
fn selection_toggle() {
    let mut sel = RowSelection::new();
    sel.toggle("4");
    assert!(sel.is_selected("4"));
    sel.toggle("4");
    assert!(!sel.is_selected("4"));
}

#[test]
fn selection_from_iter() {
    let sel: RowSelection = ["1", "3"].into_iter().collect();
    assert_eq!(sel.len(), 2);
}

#[test]
fn selection_deserializes_from_map() {
    let sel: RowSelection = serde_json::from_str(r#"{"0":true,"1":false}"#).unwrap();
    assert_eq!(sel.len(), 1);
    assert!(sel.is_selected("0"));
}

// ── Hydration ────────────────────────────────────────────────────

#[test]
fn hydrate_empty() {
    let config = TableConfig::default();
    assert_eq!(QueryState::from_query_string("", &config), QueryState::new(&config));
}

#[test]
fn hydrate_all_parameters() {
    let config = TableConfig::default();
    let s = QueryState::from_query_string(
        "?page=3&limit=20&search=sea+view&ordering=-created_at&status=active&tag=a&tag=b",
        &config,
    );
    assert_eq!(s.page_index(), 2);
    assert_eq!(s.page_size(), 20);
    assert_eq!(s.settled_search(), "sea view");
    assert_eq!(s.raw_search(), "sea view");
    assert_eq!(s.sort(), Some(&SortDescriptor::desc("created_at")));
    assert_eq!(s.filters().get("status"), Some(&FilterValue::from("active")));
    assert_eq!(
        s.filters().get("tag"),
        Some(&FilterValue::List(vec!["a".into(), "b".into()]))
    );
}

#[test]
fn hydrate_snaps_page_size() {
    let s = QueryState::from_query_string("limit=37", &TableConfig::default());
    assert_eq!(s.page_size(), 30);
}

#[test]
fn hydrate_invalid_numbers_fall_back() {
    let s = QueryState::from_query_string("page=abc&limit=-4&ordering=-", &TableConfig::default());
    assert_eq!(s.page_index(), 0);
    assert_eq!(s.page_size(), 10);
    assert!(s.sort().is_none());
}

#[test]
fn hydrate_page_zero_is_first_page() {
    let s = QueryState::from_query_string("page=0", &TableConfig::default());
    assert_eq!(s.page_index(), 0);
}

#[test]
fn hydrate_respects_filter_allow_list() {
    let config = TableConfig {
        filter_keys: vec!["status".into()],
        ..Default::default()
    };
    let s = QueryState::from_query_string("status=sold&utm_source=mail", &config);
    assert_eq!(s.filters().len(), 1);
    assert!(s.filters().contains_key("status"));
}

#[test]
fn hydrate_size_param() {
    let config = TableConfig {
        page_size_param: listview_query::PageSizeParam::Size,
        ..Default::default()
    };
    let s = QueryState::from_query_string("size=50&limit=3", &config);
    assert_eq!(s.page_size(), 50);
    assert_eq!(s.filters().get("limit"), Some(&FilterValue::from("3")));
}
