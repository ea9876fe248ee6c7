//! Record types shared by providers, fallback synthesis, and the views.
//!
//! All records are immutable snapshots: each fetch cycle replaces the prior
//! in-memory set wholesale. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which market a view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    Crypto,
    Equity,
}

impl AssetClass {
    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Crypto => "Cryptocurrency",
            AssetClass::Equity => "Equities",
        }
    }
}

/// One row in a market overview table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Provider identifier ("bitcoin", "AAPL").
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    /// 24h change in percent (already scaled, e.g. -1.15 for -1.15%).
    pub change_pct_24h: f64,
    /// Absent for assets where the provider reports no capitalization.
    pub market_cap: Option<f64>,
    pub volume: f64,
}

/// A record price with the date it was set, where the source reports one.
/// Crypto feeds date their all-time extremes; equity 52-week levels come
/// back as bare numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceExtreme {
    pub price: f64,
    pub date: Option<DateTime<Utc>>,
}

/// Full profile for the detail view — a superset of `ListingRecord`.
///
/// Optional fields reflect provider coverage: crypto profiles carry supply
/// and extrema, equity profiles carry sector/industry/exchange metadata.
/// Fallback synthesis populates every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRecord {
    pub listing: ListingRecord,
    pub description: String,
    pub all_time_high: Option<PriceExtreme>,
    pub all_time_low: Option<PriceExtreme>,
    pub circulating_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<String>,
    pub website: Option<String>,
    pub employees: Option<u64>,
}

/// One point in a historical price series.
///
/// Series are ordered ascending by timestamp and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Named chart range for the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    FiveYears,
    Max,
}

impl TimeRange {
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "7D",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::OneYear => "1Y",
            TimeRange::FiveYears => "5Y",
            TimeRange::Max => "Max",
        }
    }

    /// Window length in days; `None` means the provider's full history.
    pub fn days(self) -> Option<u32> {
        match self {
            TimeRange::OneDay => Some(1),
            TimeRange::OneWeek => Some(7),
            TimeRange::OneMonth => Some(30),
            TimeRange::ThreeMonths => Some(90),
            TimeRange::SixMonths => Some(180),
            TimeRange::OneYear => Some(365),
            TimeRange::FiveYears => Some(1825),
            TimeRange::Max => None,
        }
    }

    /// Day count used when synthesizing a fallback series.
    pub fn synth_days(self) -> u32 {
        self.days().unwrap_or(1825)
    }

    /// Ranges the crypto provider supports.
    pub fn crypto_ranges() -> &'static [TimeRange] {
        &[
            TimeRange::OneDay,
            TimeRange::OneWeek,
            TimeRange::OneMonth,
            TimeRange::ThreeMonths,
            TimeRange::SixMonths,
            TimeRange::OneYear,
            TimeRange::Max,
        ]
    }

    /// Ranges the equity provider supports.
    pub fn equity_ranges() -> &'static [TimeRange] {
        &[
            TimeRange::OneMonth,
            TimeRange::ThreeMonths,
            TimeRange::SixMonths,
            TimeRange::OneYear,
            TimeRange::FiveYears,
        ]
    }

    /// Supported ranges for an asset class.
    pub fn ranges_for(class: AssetClass) -> &'static [TimeRange] {
        match class {
            AssetClass::Crypto => Self::crypto_ranges(),
            AssetClass::Equity => Self::equity_ranges(),
        }
    }

    /// Next range in the per-class cycle (wraps).
    pub fn next_for(self, class: AssetClass) -> TimeRange {
        let ranges = Self::ranges_for(class);
        let idx = ranges.iter().position(|r| *r == self).unwrap_or(0);
        ranges[(idx + 1) % ranges.len()]
    }

    /// Default range per asset class (matches provider defaults).
    pub fn default_for(class: AssetClass) -> TimeRange {
        match class {
            AssetClass::Crypto => TimeRange::OneYear,
            AssetClass::Equity => TimeRange::OneYear,
        }
    }
}

/// Where a record set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    Live,
    Synthetic,
}

/// Format a dollar amount the way the dashboard displays prices.
///
/// Sub-dollar assets get extra precision so small-cap coins don't render
/// as $0.00.
pub fn format_price(value: f64) -> String {
    if value < 1.0 {
        format!("${value:.4}")
    } else {
        format!("${value:.2}")
    }
}

/// Abbreviated market-cap style: $2.95T, $573.00B, $45.60M.
pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${value:.2}")
    }
}

/// Abbreviated volume/supply style: 1.25B, 58.90M, 3.20K.
pub fn format_quantity(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

/// Signed percent with explicit plus for gains: "+2.53%", "-1.15%".
pub fn format_change_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_cycle_wraps() {
        let last = *TimeRange::crypto_ranges().last().unwrap();
        assert_eq!(last.next_for(AssetClass::Crypto), TimeRange::OneDay);
        let last = *TimeRange::equity_ranges().last().unwrap();
        assert_eq!(last.next_for(AssetClass::Equity), TimeRange::OneMonth);
    }

    #[test]
    fn range_days() {
        assert_eq!(TimeRange::OneMonth.days(), Some(30));
        assert_eq!(TimeRange::Max.days(), None);
        assert_eq!(TimeRange::Max.synth_days(), 1825);
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(187.32), "$187.32");
        assert_eq!(format_price(0.0712), "$0.0712");
    }

    #[test]
    fn market_cap_formatting() {
        assert_eq!(format_market_cap(2_950_000_000_000.0), "$2.95T");
        assert_eq!(format_market_cap(573_000_000_000.0), "$573.00B");
        assert_eq!(format_market_cap(45_600_000.0), "$45.60M");
        assert_eq!(format_market_cap(950.5), "$950.50");
    }

    #[test]
    fn quantity_formatting() {
        assert_eq!(format_quantity(58_900_000.0), "58.90M");
        assert_eq!(format_quantity(1_250_000_000.0), "1.25B");
        assert_eq!(format_quantity(3_200.0), "3.20K");
        assert_eq!(format_quantity(412.0), "412");
    }

    #[test]
    fn change_formatting_is_signed() {
        assert_eq!(format_change_pct(2.53), "+2.53%");
        assert_eq!(format_change_pct(-1.15), "-1.15%");
        assert_eq!(format_change_pct(0.0), "+0.00%");
    }
}
