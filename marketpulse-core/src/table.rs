//! Table controller — text filter plus stable single-column sort.
//!
//! Sort keys are an explicit accessor table rather than stringly-typed field
//! paths: each `SortKey` knows how to extract its comparable value from a
//! record. Missing numeric values (e.g. absent market cap) order before
//! present ones.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::ListingRecord;
use crate::pager::PageWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Sortable columns of the listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    Symbol,
    Price,
    ChangePct,
    MarketCap,
    Volume,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Symbol => "Symbol",
            SortKey::Price => "Price",
            SortKey::ChangePct => "24h Change",
            SortKey::MarketCap => "Market Cap",
            SortKey::Volume => "Volume",
        }
    }

    /// Typed extraction for numeric keys. `None` for text keys.
    fn numeric(self, record: &ListingRecord) -> Option<Option<f64>> {
        match self {
            SortKey::Price => Some(Some(record.price)),
            SortKey::ChangePct => Some(Some(record.change_pct_24h)),
            SortKey::MarketCap => Some(record.market_cap),
            SortKey::Volume => Some(Some(record.volume)),
            SortKey::Name | SortKey::Symbol => None,
        }
    }

    /// Compare two records on this key, ascending.
    pub fn compare(self, a: &ListingRecord, b: &ListingRecord) -> Ordering {
        match self {
            SortKey::Name => compare_text(&a.name, &b.name),
            SortKey::Symbol => compare_text(&a.symbol, &b.symbol),
            _ => {
                let av = self.numeric(a).unwrap_or(None);
                let bv = self.numeric(b).unwrap_or(None);
                compare_optional(av, bv)
            }
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Missing values sort before present ones.
fn compare_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

/// The single active sort: one key, one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }
}

/// Filter + sort a record set. Pure; the caller owns pagination.
pub fn apply_view(
    records: &[ListingRecord],
    query: &str,
    sort: Option<SortDirective>,
) -> Vec<ListingRecord> {
    let needle = query.trim().to_lowercase();
    let mut result: Vec<ListingRecord> = records
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.name.to_lowercase().contains(&needle)
                || r.symbol.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if let Some(directive) = sort {
        // Vec::sort_by is stable, so ties keep fetch order.
        result.sort_by(|a, b| {
            let ord = directive.key.compare(a, b);
            match directive.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    result
}

/// Owns the full record set plus the active query, sort, and page window.
///
/// Every mutation that changes the visible set (new records, new query, new
/// sort) re-derives the filtered view and resets pagination to page 1.
#[derive(Debug, Clone)]
pub struct TableState {
    records: Vec<ListingRecord>,
    query: String,
    sort: Option<SortDirective>,
    filtered: Vec<ListingRecord>,
    pub pager: PageWindow,
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        let mut state = Self {
            records: Vec::new(),
            query: String::new(),
            sort: None,
            filtered: Vec::new(),
            pager: PageWindow::new(page_size),
        };
        state.pager.recompute(0);
        state
    }

    /// Replace the record set wholesale (each fetch cycle does this).
    pub fn set_records(&mut self, records: Vec<ListingRecord>) {
        self.records = records;
        self.reapply();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.reapply();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> Option<SortDirective> {
        self.sort
    }

    /// Select a sort column. Re-selecting the active column toggles the
    /// direction; a new column starts ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        self.sort = Some(match self.sort {
            Some(d) if d.key == key => SortDirective {
                key,
                direction: d.direction.flipped(),
            },
            _ => SortDirective::ascending(key),
        });
        self.reapply();
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.pager.set_page_size(size);
        self.pager.recompute(self.filtered.len());
    }

    pub fn cycle_page_size(&mut self) {
        self.pager.cycle_page_size();
        self.pager.recompute(self.filtered.len());
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn filtered(&self) -> &[ListingRecord] {
        &self.filtered
    }

    /// The slice of records on the current page.
    pub fn page_items(&self) -> &[ListingRecord] {
        let bounds = self.pager.page_bounds(self.filtered.len());
        &self.filtered[bounds]
    }

    fn reapply(&mut self) {
        self.filtered = apply_view(&self.records, &self.query, self.sort);
        self.pager.reset();
        self.pager.recompute(self.filtered.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, symbol: &str, price: f64) -> ListingRecord {
        ListingRecord {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            price,
            change_pct_24h: 0.0,
            market_cap: Some(price * 1e9),
            volume: 1e6,
        }
    }

    fn sample() -> Vec<ListingRecord> {
        vec![
            record("bitcoin", "Bitcoin", "btc", 64_000.0),
            record("ethereum", "Ethereum", "eth", 3_200.0),
            record("tether", "Tether", "usdt", 1.0),
            record("solana", "Solana", "sol", 145.0),
        ]
    }

    #[test]
    fn empty_query_matches_all() {
        assert_eq!(apply_view(&sample(), "", None).len(), 4);
        assert_eq!(apply_view(&sample(), "   ", None).len(), 4);
    }

    #[test]
    fn filter_matches_name_or_symbol_case_insensitively() {
        let hits = apply_view(&sample(), "ETH", None);
        // "eth" hits Ethereum (name + symbol) and Tether (name).
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|r| r.id == "ethereum"));
        assert!(hits.iter().any(|r| r.id == "tether"));

        let by_symbol = apply_view(&sample(), "usdt", None);
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].id, "tether");
    }

    #[test]
    fn no_sort_preserves_fetch_order() {
        let view = apply_view(&sample(), "", None);
        let ids: Vec<&str> = view.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["bitcoin", "ethereum", "tether", "solana"]);
    }

    #[test]
    fn descending_is_reverse_of_ascending() {
        let asc = apply_view(&sample(), "", Some(SortDirective::ascending(SortKey::Price)));
        let desc = apply_view(
            &sample(),
            "",
            Some(SortDirective {
                key: SortKey::Price,
                direction: SortDirection::Descending,
            }),
        );
        let mut reversed = asc.clone();
        reversed.reverse();
        let up: Vec<&str> = reversed.iter().map(|r| r.id.as_str()).collect();
        let down: Vec<&str> = desc.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(up, down);
    }

    #[test]
    fn missing_market_cap_sorts_before_present() {
        let mut records = sample();
        records[2].market_cap = None; // tether
        let view = apply_view(
            &records,
            "",
            Some(SortDirective::ascending(SortKey::MarketCap)),
        );
        assert_eq!(view[0].id, "tether");
    }

    #[test]
    fn reselecting_the_same_key_toggles_direction() {
        let mut table = TableState::new(10);
        table.set_records(sample());
        table.request_sort(SortKey::Name);
        assert_eq!(
            table.sort().unwrap().direction,
            SortDirection::Ascending
        );
        table.request_sort(SortKey::Name);
        assert_eq!(
            table.sort().unwrap().direction,
            SortDirection::Descending
        );
        // A different key starts ascending again.
        table.request_sort(SortKey::Price);
        assert_eq!(table.sort().unwrap().direction, SortDirection::Ascending);
    }

    #[test]
    fn query_and_sort_changes_reset_the_page() {
        let mut table = TableState::new(2);
        table.set_records(sample());
        table.pager.set_page(2);
        assert_eq!(table.pager.current_page(), 2);

        table.set_query("e");
        assert_eq!(table.pager.current_page(), 1);

        table.pager.set_page(2);
        table.request_sort(SortKey::Price);
        assert_eq!(table.pager.current_page(), 1);

        table.pager.set_page(2);
        table.set_records(sample());
        assert_eq!(table.pager.current_page(), 1);
    }

    #[test]
    fn page_items_slices_the_filtered_view() {
        let mut table = TableState::new(3);
        table.set_records(sample());
        assert_eq!(table.page_items().len(), 3);
        table.pager.next_page();
        assert_eq!(table.page_items().len(), 1);
    }

    #[test]
    fn text_sort_ignores_case() {
        let records = vec![
            record("a", "apple", "a", 1.0),
            record("b", "Banana", "b", 1.0),
            record("c", "cherry", "c", 1.0),
        ];
        let view = apply_view(&records, "", Some(SortDirective::ascending(SortKey::Name)));
        let names: Vec<&str> = view.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["apple", "Banana", "cherry"]);
    }
}
