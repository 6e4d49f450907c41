use listview_query::address::mock::MemoryAddressBar;
use listview_query::{
    parse_query_string, url_path, AddressBar, PageSizeParam, QueryState, TableConfig,
    UrlSynchronizer,
};
use listview_types::{FilterValue, SortDescriptor};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const PAGE: &str = "/admin/properties";

fn config() -> TableConfig {
    TableConfig::default()
}

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn defaults_render_empty_query() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let q = QueryState::new(&cfg).canonical();
    assert_eq!(url.query_string(&q), "");
    assert_eq!(url.href(PAGE, &q), "/admin/properties");
}

#[test]
fn non_defaults_are_rendered_in_fixed_order() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("status", "active");
    s.set_page_size(20);
    s.settle_search("sea view");
    s.set_sort(Some(SortDescriptor::desc("created_at")));
    s.set_page_index(2);
    assert_eq!(
        url.query_string(&s.canonical()),
        "page=3&limit=20&search=sea%20view&ordering=-created_at&status=active"
    );
}

#[test]
fn array_filters_repeat_key() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("tag", FilterValue::List(vec!["pool".into(), "garden".into()]));
    assert_eq!(url.query_string(&s.canonical()), "tag=pool&tag=garden");
}

#[test]
fn size_param_key() {
    let cfg = TableConfig {
        page_size_param: PageSizeParam::Size,
        ..config()
    };
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_page_size(50);
    assert_eq!(url.query_string(&s.canonical()), "size=50");
}

#[test]
fn reserved_filter_keys_are_not_mirrored() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("page", "7");
    assert_eq!(url.query_string(&s.canonical()), "");
}

#[test]
fn special_characters_are_encoded() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.settle_search("a&b=c");
    assert_eq!(url.query_string(&s.canonical()), "search=a%26b%3Dc");
}

// ── Paths ────────────────────────────────────────────────────────

#[test]
fn href_keeps_current_path_and_fragment() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("status", "active");
    assert_eq!(
        url.href("/admin/properties?page=4#top", &s.canonical()),
        "/admin/properties?status=active#top"
    );
    assert_eq!(url.href("", &s.canonical()), "/?status=active");
}

#[test]
fn configured_path_overrides_current() {
    let cfg = TableConfig {
        path: Some("/listings".into()),
        ..config()
    };
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("status", "active");
    assert_eq!(url.path_override(), Some("/listings"));
    assert_eq!(url.href("/admin/properties", &s.canonical()), "/listings?status=active");
}

#[test]
fn url_path_strips_query_and_fragment() {
    assert_eq!(url_path("/a/b?x=1#f"), "/a/b");
    assert_eq!(url_path("/a#f?x"), "/a");
    assert_eq!(url_path("?x=1"), "/");
}

// ── Writing ──────────────────────────────────────────────────────

#[test]
fn sync_writes_once() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let bar = MemoryAddressBar::new("/admin/properties");
    let mut s = QueryState::new(&cfg);
    s.set_sort(Some(SortDescriptor::desc("created_at")));

    assert!(url.sync(&bar, &s.canonical()));
    assert_eq!(bar.current(), "/admin/properties?ordering=-created_at");
    assert!(!url.sync(&bar, &s.canonical()));
    assert_eq!(bar.write_count(), 1);
}

#[test]
fn sync_writes_at_nested_path_with_default_config() {
    let cfg = TableConfig::default();
    let url = UrlSynchronizer::new(&cfg);
    let bar = MemoryAddressBar::new("/admin/properties");
    let mut s = QueryState::new(&cfg);
    s.set_filter("status", "active");

    assert!(url.sync(&bar, &s.canonical()));
    assert_eq!(bar.replacements(), vec!["/admin/properties?status=active".to_string()]);
}

#[test]
fn sync_skips_default_view() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let bar = MemoryAddressBar::new("/admin/properties");
    assert!(!url.sync(&bar, &QueryState::new(&cfg).canonical()));
    assert_eq!(bar.write_count(), 0);
}

#[test]
fn sync_skips_when_decoded_url_matches() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let bar = MemoryAddressBar::new("/admin/properties?search=sea+view");
    let mut s = QueryState::new(&cfg);
    s.settle_search("sea view");
    assert!(!url.sync(&bar, &s.canonical()));
    assert_eq!(bar.current(), "/admin/properties?search=sea+view");
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_pairs() {
    assert_eq!(
        parse_query_string("?a=1&b=x%20y&&c&d=e+f"),
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "x y".to_string()),
            ("c".to_string(), String::new()),
            ("d".to_string(), "e f".to_string()),
        ]
    );
}

#[test]
fn reload_reproduces_state() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("status", "active");
    s.set_filter("tag", FilterValue::List(vec!["a".into(), "b".into()]));
    s.settle_search("villa");
    s.set_raw_search("villa");
    s.set_sort(Some(SortDescriptor::asc("price")));
    s.set_page_size(30);
    s.set_page_index(4);

    let qs = url.query_string(&s.canonical());
    let reloaded = QueryState::from_query_string(&qs, &cfg);
    assert_eq!(reloaded, s);
}

#[test]
fn declared_list_filter_survives_reload_with_one_value() {
    let cfg = TableConfig {
        list_filter_keys: vec!["tag".into()],
        ..config()
    };
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("tag", FilterValue::List(vec!["pool".into()]));
    s.set_filter("status", "active");

    let qs = url.query_string(&s.canonical());
    assert_eq!(qs, "status=active&tag=pool");
    let reloaded = QueryState::from_query_string(&qs, &cfg);
    assert_eq!(reloaded.filters().get("tag"), Some(&FilterValue::List(vec!["pool".into()])));
    assert_eq!(reloaded.filters().get("status"), Some(&FilterValue::Text("active".into())));
    assert_eq!(reloaded, s);
}

#[test]
fn undeclared_scalar_filters_reload_as_text() {
    let cfg = config();
    let url = UrlSynchronizer::new(&cfg);
    let mut s = QueryState::new(&cfg);
    s.set_filter("bedrooms", FilterValue::Number(3));

    let qs = url.query_string(&s.canonical());
    let reloaded = QueryState::from_query_string(&qs, &cfg);
    assert_eq!(reloaded.filters().get("bedrooms"), Some(&FilterValue::Text("3".into())));
    assert_eq!(url.query_string(&reloaded.canonical()), qs);
}

proptest! {
    /// Rendering twice gives byte-identical output, and hydrating the output
    /// gives back the same canonical query.
    #[test]
    fn url_is_idempotent(
        page in 0u32..50,
        size in 1u32..100,
        search in "[a-z ]{0,8}",
        status in "[a-z]{0,5}",
        descending in any::<bool>(),
    ) {
        let cfg = config();
        let url = UrlSynchronizer::new(&cfg);
        let mut s = QueryState::new(&cfg);
        s.set_page_size(size);
        s.settle_search(search);
        s.set_filter("status", status);
        s.set_sort(Some(SortDescriptor { field: "price".into(), descending }));
        s.set_page_index(page);

        let first = url.href(PAGE, &s.canonical());
        let second = url.href(PAGE, &s.canonical());
        prop_assert_eq!(&first, &second);

        let qs = url.query_string(&s.canonical());
        let reloaded = QueryState::from_query_string(&qs, &cfg);
        prop_assert_eq!(reloaded.canonical(), s.canonical());
    }
}
