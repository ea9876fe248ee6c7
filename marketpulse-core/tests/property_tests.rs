//! Property tests for view-layer invariants.
//!
//! Uses proptest to verify:
//! 1. Filter correctness — filtered rows match the query, excluded rows don't
//! 2. Sort ordering — sorted views are ordered per key, missing values first
//! 3. Pagination accounting — pages partition the filtered set exactly
//! 4. Page-link window — links always anchor first and last page
//! 5. Synthesis determinism — same identifier, same synthetic values

use proptest::prelude::*;
use marketpulse_core::fallback::{synthetic_listing, synthetic_series};
use marketpulse_core::model::{AssetClass, ListingRecord, TimeRange};
use marketpulse_core::pager::{PageLink, PageWindow, PAGE_SIZES};
use marketpulse_core::table::{apply_view, SortDirection, SortDirective, SortKey, TableState};
use marketpulse_core::watchlist::Watchlist;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-Z]{1,5}"
}

fn arb_record() -> impl Strategy<Value = ListingRecord> {
    (
        "[a-z]{2,10}",
        "[A-Za-z ]{3,16}",
        arb_symbol(),
        0.01..100_000.0_f64,
        -50.0..50.0_f64,
        proptest::option::of(1e6..1e13_f64),
        0.0..1e11_f64,
    )
        .prop_map(
            |(id, name, symbol, price, change, market_cap, volume)| ListingRecord {
                id,
                name,
                symbol,
                price,
                change_pct_24h: change,
                market_cap,
                volume,
            },
        )
}

fn arb_records() -> impl Strategy<Value = Vec<ListingRecord>> {
    proptest::collection::vec(arb_record(), 0..60)
}

fn matches(record: &ListingRecord, query: &str) -> bool {
    let q = query.to_lowercase();
    record.name.to_lowercase().contains(&q) || record.symbol.to_lowercase().contains(&q)
}

// ── 1. Filter correctness ────────────────────────────────────────────

proptest! {
    /// Every filtered row matches the query; every excluded row does not.
    #[test]
    fn filter_keeps_exactly_the_matching_rows(
        records in arb_records(),
        query in "[a-zA-Z]{0,4}",
    ) {
        let view = apply_view(&records, &query, None);
        for row in &view {
            prop_assert!(matches(row, &query));
        }
        let kept = view.len();
        let expected = records.iter().filter(|r| matches(r, &query)).count();
        prop_assert_eq!(kept, expected);
    }

    /// An empty query is the identity filter.
    #[test]
    fn empty_query_keeps_everything(records in arb_records()) {
        let view = apply_view(&records, "", None);
        prop_assert_eq!(view.len(), records.len());
    }
}

// ── 2. Sort ordering ─────────────────────────────────────────────────

proptest! {
    /// Ascending price sort yields a non-decreasing sequence.
    #[test]
    fn price_sort_is_ordered(records in arb_records()) {
        let view = apply_view(
            &records,
            "",
            Some(SortDirective::ascending(SortKey::Price)),
        );
        for pair in view.windows(2) {
            prop_assert!(pair[0].price <= pair[1].price);
        }
    }

    /// Missing market caps order before every present one, ascending.
    #[test]
    fn missing_values_sort_first(records in arb_records()) {
        let view = apply_view(
            &records,
            "",
            Some(SortDirective::ascending(SortKey::MarketCap)),
        );
        let first_present = view.iter().position(|r| r.market_cap.is_some());
        if let Some(idx) = first_present {
            prop_assert!(view[..idx].iter().all(|r| r.market_cap.is_none()));
            prop_assert!(view[idx..].iter().all(|r| r.market_cap.is_some()));
        }
    }

    /// Sorting never adds or drops rows.
    #[test]
    fn sort_is_a_permutation(records in arb_records()) {
        let view = apply_view(
            &records,
            "",
            Some(SortDirective::ascending(SortKey::Name)),
        );
        prop_assert_eq!(view.len(), records.len());
        let mut before: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let mut after: Vec<&str> = view.iter().map(|r| r.id.as_str()).collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    /// Re-requesting the active sort key flips direction and keeps the key.
    #[test]
    fn resort_toggles_direction(records in arb_records()) {
        let mut state = TableState::new(10);
        state.set_records(records);
        state.request_sort(SortKey::Price);
        let first = state.sort().unwrap();
        prop_assert_eq!(first.direction, SortDirection::Ascending);

        state.request_sort(SortKey::Price);
        let second = state.sort().unwrap();
        prop_assert_eq!(second.key, first.key);
        prop_assert_eq!(second.direction, first.direction.flipped());
    }
}

// ── 3. Pagination accounting ─────────────────────────────────────────

proptest! {
    /// Page bounds partition the filtered set: disjoint, complete, ordered.
    #[test]
    fn pages_partition_the_records(
        len in 0usize..500,
        size_idx in 0usize..PAGE_SIZES.len(),
    ) {
        let size = PAGE_SIZES[size_idx];
        let mut pager = PageWindow::new(size);
        pager.recompute(len);

        let expected_pages = len.div_ceil(size).max(1);
        prop_assert_eq!(pager.total_pages(), expected_pages);

        let mut covered = 0;
        for page in 1..=pager.total_pages() {
            pager.set_page(page);
            let bounds = pager.page_bounds(len);
            prop_assert_eq!(bounds.start, covered);
            covered = bounds.end;
        }
        prop_assert_eq!(covered, len);
    }

    /// The current page stays in range after any shrink.
    #[test]
    fn current_page_survives_shrinking(
        initial in 1usize..500,
        shrunk in 0usize..500,
        page in 1usize..60,
    ) {
        let mut pager = PageWindow::new(10);
        pager.recompute(initial);
        pager.set_page(page.min(pager.total_pages()));
        pager.recompute(shrunk);
        prop_assert!(pager.current_page() >= 1);
        prop_assert!(pager.current_page() <= pager.total_pages());
    }
}

// ── 4. Page-link window ──────────────────────────────────────────────

proptest! {
    /// Links always include page 1, the last page, and the current page.
    #[test]
    fn page_links_anchor_first_last_and_current(
        len in 1usize..2000,
        page in 1usize..250,
    ) {
        let mut pager = PageWindow::new(10);
        pager.recompute(len);
        pager.set_page(page.min(pager.total_pages()));

        let links = pager.page_links();
        let total = pager.total_pages();
        prop_assert_eq!(links.first(), Some(&PageLink::Page(1)));
        prop_assert_eq!(links.last(), Some(&PageLink::Page(total)));
        prop_assert!(links.contains(&PageLink::Page(pager.current_page())));
        // Never more than: 1, gap, three interior pages, gap, last.
        prop_assert!(links.len() <= 7);
    }

    /// Numbered links are strictly increasing with no duplicates.
    #[test]
    fn page_links_are_strictly_increasing(len in 1usize..2000, page in 1usize..250) {
        let mut pager = PageWindow::new(10);
        pager.recompute(len);
        pager.set_page(page.min(pager.total_pages()));

        let numbers: Vec<usize> = pager
            .page_links()
            .iter()
            .filter_map(|l| match l {
                PageLink::Page(n) => Some(*n),
                PageLink::Ellipsis => None,
            })
            .collect();
        for pair in numbers.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }
}

// ── 5. Synthesis determinism ─────────────────────────────────────────

proptest! {
    /// Unknown identifiers synthesize the same listing every time.
    #[test]
    fn synthetic_listing_is_stable(id in "[a-z0-9-]{1,20}") {
        let wl = Watchlist::default_universe();
        let a = synthetic_listing(&wl, &id, AssetClass::Crypto);
        let b = synthetic_listing(&wl, &id, AssetClass::Crypto);
        prop_assert_eq!(a.price, b.price);
        prop_assert_eq!(a.change_pct_24h, b.change_pct_24h);
        prop_assert_eq!(a.market_cap, b.market_cap);
        prop_assert_eq!(a.volume, b.volume);
    }

    /// Synthetic series are inclusive of both endpoints and strictly positive.
    #[test]
    fn synthetic_series_shape(id in "[a-z]{1,12}", range_idx in 0usize..8) {
        let ranges = [
            TimeRange::OneDay,
            TimeRange::OneWeek,
            TimeRange::OneMonth,
            TimeRange::ThreeMonths,
            TimeRange::SixMonths,
            TimeRange::OneYear,
            TimeRange::FiveYears,
            TimeRange::Max,
        ];
        let range = ranges[range_idx];
        let wl = Watchlist::default_universe();
        let points = synthetic_series(&wl, &id, range);
        prop_assert_eq!(points.len(), range.synth_days() as usize + 1);
        prop_assert!(points.iter().all(|p| p.price > 0.0));
        for pair in points.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }
}
