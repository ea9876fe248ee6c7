//! Watchlist configuration — equity symbols plus fallback seed records.
//!
//! Stored as a TOML config file with the tracked equity symbols and a
//! table of seed records used when live data is unavailable. A compiled-in
//! default covers first runs with no config file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{AssetClass, ListingRecord};

/// Fixed listing values for a known identifier, used verbatim by the
/// fallback layer instead of synthesizing pseudo-random ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRecord {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub class: AssetClass,
    pub price: f64,
    pub change_pct_24h: f64,
    pub market_cap: f64,
    pub volume: f64,
    pub sector: Option<String>,
}

impl SeedRecord {
    pub fn to_listing(&self) -> ListingRecord {
        ListingRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            price: self.price,
            change_pct_24h: self.change_pct_24h,
            market_cap: Some(self.market_cap),
            volume: self.volume,
        }
    }
}

/// The complete watchlist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    /// Equity symbols fetched as one batch quote.
    pub equities: Vec<String>,
    /// Seed records keyed by identifier, both asset classes mixed.
    pub seeds: Vec<SeedRecord>,
}

impl Watchlist {
    /// Load a watchlist from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read watchlist file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a watchlist from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse watchlist TOML: {e}"))
    }

    /// Look up a seed record by identifier, case-insensitively.
    pub fn seed(&self, id: &str) -> Option<&SeedRecord> {
        self.seeds.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    /// Seed records for one asset class, in config order.
    pub fn seeds_for(&self, class: AssetClass) -> Vec<&SeedRecord> {
        self.seeds.iter().filter(|s| s.class == class).collect()
    }

    /// Create the default watchlist: twenty large-cap equities and seed
    /// records for the majors in both classes.
    pub fn default_universe() -> Self {
        let equities = [
            "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "JPM", "V", "WMT", "PG",
            "JNJ", "UNH", "HD", "MA", "BAC", "PFE", "CSCO", "ADBE", "CRM",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let equity =
            |symbol: &str, name: &str, price: f64, change: f64, cap: f64, vol: f64, sector: &str| {
                SeedRecord {
                    id: symbol.to_string(),
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    class: AssetClass::Equity,
                    price,
                    change_pct_24h: change,
                    market_cap: cap,
                    volume: vol,
                    sector: Some(sector.to_string()),
                }
            };
        let crypto = |id: &str, symbol: &str, name: &str, price: f64, change: f64, cap: f64, vol: f64| {
            SeedRecord {
                id: id.to_string(),
                symbol: symbol.to_string(),
                name: name.to_string(),
                class: AssetClass::Crypto,
                price,
                change_pct_24h: change,
                market_cap: cap,
                volume: vol,
                sector: None,
            }
        };

        let seeds = vec![
            equity("AAPL", "Apple Inc.", 187.32, 0.67, 2_950_000_000_000.0, 58_900_000.0, "Technology"),
            equity("MSFT", "Microsoft Corporation", 418.56, -0.56, 3_110_000_000_000.0, 21_500_000.0, "Technology"),
            equity("GOOGL", "Alphabet Inc.", 175.98, 2.0, 2_210_000_000_000.0, 25_600_000.0, "Technology"),
            equity("AMZN", "Amazon.com Inc.", 178.75, -0.68, 1_850_000_000_000.0, 32_100_000.0, "Consumer Cyclical"),
            equity("TSLA", "Tesla, Inc.", 175.34, 3.34, 557_000_000_000.0, 98_700_000.0, "Automotive"),
            equity("NVDA", "NVIDIA Corporation", 950.02, 2.53, 2_340_000_000_000.0, 45_600_000.0, "Technology"),
            equity("META", "Meta Platforms, Inc.", 487.95, -1.15, 1_250_000_000_000.0, 18_900_000.0, "Technology"),
            equity("JPM", "JPMorgan Chase & Co.", 198.45, 0.62, 573_000_000_000.0, 8_900_000.0, "Financial Services"),
            equity("V", "Visa Inc.", 275.67, -0.32, 560_000_000_000.0, 6_700_000.0, "Financial Services"),
            equity("WMT", "Walmart Inc.", 67.89, 0.67, 545_000_000_000.0, 7_800_000.0, "Consumer Defensive"),
            equity("PG", "Procter & Gamble Co.", 165.78, 0.68, 390_000_000_000.0, 5_600_000.0, "Consumer Defensive"),
            equity("JNJ", "Johnson & Johnson", 152.5, -0.49, 367_000_000_000.0, 6_200_000.0, "Healthcare"),
            crypto("bitcoin", "BTC", "Bitcoin", 64_250.0, 1.84, 1_265_000_000_000.0, 28_400_000_000.0),
            crypto("ethereum", "ETH", "Ethereum", 3_412.0, 0.92, 410_000_000_000.0, 14_600_000_000.0),
            crypto("tether", "USDT", "Tether", 1.0, 0.01, 112_000_000_000.0, 51_300_000_000.0),
            crypto("binancecoin", "BNB", "BNB", 587.4, -0.73, 86_400_000_000.0, 1_620_000_000.0),
            crypto("solana", "SOL", "Solana", 148.9, 3.21, 69_200_000_000.0, 2_840_000_000.0),
            crypto("ripple", "XRP", "XRP", 0.52, -1.12, 28_900_000_000.0, 1_110_000_000.0),
            crypto("usd-coin", "USDC", "USDC", 1.0, 0.0, 32_400_000_000.0, 5_970_000_000.0),
            crypto("cardano", "ADA", "Cardano", 0.44, 0.58, 15_700_000_000.0, 312_000_000.0),
            crypto("dogecoin", "DOGE", "Dogecoin", 0.12, 4.76, 17_900_000_000.0, 931_000_000.0),
            crypto("avalanche-2", "AVAX", "Avalanche", 29.8, -2.14, 11_700_000_000.0, 284_000_000.0),
        ];

        Self { equities, seeds }
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::default_universe()
    }
}
