use listview_types::{PageSizes, Pagination};
use proptest::prelude::*;

// ── PageSizes ─────────────────────────────────────────────────────

#[test]
fn default_sizes() {
    assert_eq!(PageSizes::default().as_slice(), &[10, 20, 30, 50]);
}

#[test]
fn new_sorts_and_dedups() {
    let sizes = PageSizes::new([50, 10, 20, 10]).unwrap();
    assert_eq!(sizes.as_slice(), &[10, 20, 50]);
}

#[test]
fn new_drops_zero() {
    let sizes = PageSizes::new([0, 25]).unwrap();
    assert_eq!(sizes.as_slice(), &[25]);
}

#[test]
fn new_rejects_empty() {
    assert!(PageSizes::new(Vec::new()).is_err());
    assert!(PageSizes::new([0]).is_err());
}

#[test]
fn snap_to_nearest() {
    let sizes = PageSizes::new([10, 20, 30, 50]).unwrap();
    assert_eq!(sizes.snap(37), 30);
    assert_eq!(sizes.snap(44), 50);
    assert_eq!(sizes.snap(1), 10);
    assert_eq!(sizes.snap(1000), 50);
}

#[test]
fn snap_member_is_identity() {
    let sizes = PageSizes::default();
    for size in [10, 20, 30, 50] {
        assert_eq!(sizes.snap(size), size);
    }
}

#[test]
fn snap_tie_prefers_smaller() {
    let sizes = PageSizes::new([10, 20]).unwrap();
    assert_eq!(sizes.snap(15), 10);
}

#[test]
fn contains() {
    let sizes = PageSizes::default();
    assert!(sizes.contains(20));
    assert!(!sizes.contains(25));
}

#[test]
fn deserialize_validates() {
    let sizes: PageSizes = serde_json::from_str("[30, 10]").unwrap();
    assert_eq!(sizes.as_slice(), &[10, 30]);
    assert!(serde_json::from_str::<PageSizes>("[]").is_err());
}

// ── Pagination ────────────────────────────────────────────────────

#[test]
fn page_number_is_one_based() {
    assert_eq!(Pagination::new(0, 10).page_number(), 1);
    assert_eq!(Pagination::new(3, 10).page_number(), 4);
}

#[test]
fn page_count_rounds_up() {
    let p = Pagination::new(0, 10);
    assert_eq!(p.page_count(0), 0);
    assert_eq!(p.page_count(7), 1);
    assert_eq!(p.page_count(10), 1);
    assert_eq!(p.page_count(11), 2);
}

#[test]
fn page_count_zero_size() {
    assert_eq!(Pagination::new(0, 0).page_count(100), 0);
}

proptest! {
    /// Snapped sizes are always members of the set.
    #[test]
    fn snap_is_member(requested in 0u32..10_000) {
        let sizes = PageSizes::default();
        prop_assert!(sizes.contains(sizes.snap(requested)));
    }

    /// Snapping is idempotent.
    #[test]
    fn snap_is_idempotent(requested in 0u32..10_000) {
        let sizes = PageSizes::new([5, 25, 100]).unwrap();
        let once = sizes.snap(requested);
        prop_assert_eq!(sizes.snap(once), once);
    }
}
