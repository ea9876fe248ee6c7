//! CoinGecko client — crypto listings, coin profiles, and market charts.
//!
//! Uses the public v3 API. Listings come from `/coins/markets` ordered by
//! market cap, 100 per page; profiles from `/coins/{id}`; series from
//! `/coins/{id}/market_chart` keyed by day count (or `max`).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{get_json, CircuitBreaker, FetchError, MarketProvider};
use crate::model::{
    AssetClass, DetailRecord, ListingRecord, PriceExtreme, PricePoint, TimeRange,
};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct MarketsRow {
    id: String,
    name: String,
    symbol: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UsdValue {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UsdDate {
    usd: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: UsdValue,
    price_change_percentage_24h: Option<f64>,
    market_cap: UsdValue,
    total_volume: UsdValue,
    circulating_supply: Option<f64>,
    max_supply: Option<f64>,
    ath: UsdValue,
    atl: UsdValue,
    ath_date: Option<UsdDate>,
    atl_date: Option<UsdDate>,
}

#[derive(Debug, Deserialize)]
struct Description {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    id: String,
    name: String,
    symbol: String,
    description: Option<Description>,
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    /// `[timestamp_ms, price]` pairs, ascending.
    prices: Vec<(i64, f64)>,
}

pub struct CoinGeckoProvider {
    client: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
}

impl CoinGeckoProvider {
    pub fn new(breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            client: super::build_client(),
            breaker,
        }
    }

    fn extreme(value: &UsdValue, date: &Option<UsdDate>) -> Option<PriceExtreme> {
        value.usd.map(|price| PriceExtreme {
            price,
            date: date.as_ref().and_then(|d| d.usd),
        })
    }
}

impl MarketProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Crypto
    }

    fn listings(&self) -> Result<Vec<ListingRecord>, FetchError> {
        let url = format!(
            "{BASE_URL}/coins/markets?vs_currency=usd&order=market_cap_desc\
             &per_page=100&page=1&sparkline=false&price_change_percentage=24h"
        );
        let rows: Vec<MarketsRow> = get_json(&self.client, &self.breaker, &url, None)?;

        Ok(rows
            .into_iter()
            .map(|row| ListingRecord {
                id: row.id,
                name: row.name,
                symbol: row.symbol.to_uppercase(),
                price: row.current_price.unwrap_or(0.0),
                change_pct_24h: row.price_change_percentage_24h.unwrap_or(0.0),
                market_cap: row.market_cap,
                volume: row.total_volume.unwrap_or(0.0),
            })
            .collect())
    }

    fn detail(&self, id: &str) -> Result<DetailRecord, FetchError> {
        let url = format!(
            "{BASE_URL}/coins/{id}?localization=false&tickers=false&market_data=true\
             &community_data=false&developer_data=false"
        );
        let coin: CoinResponse = get_json(&self.client, &self.breaker, &url, Some(id))?;

        let market = coin
            .market_data
            .ok_or_else(|| FetchError::Malformed(format!("{id}: missing market_data")))?;
        let price = market
            .current_price
            .usd
            .ok_or_else(|| FetchError::Malformed(format!("{id}: missing current price")))?;

        Ok(DetailRecord {
            listing: ListingRecord {
                id: coin.id,
                name: coin.name,
                symbol: coin.symbol.to_uppercase(),
                price,
                change_pct_24h: market.price_change_percentage_24h.unwrap_or(0.0),
                market_cap: market.market_cap.usd,
                volume: market.total_volume.usd.unwrap_or(0.0),
            },
            description: coin
                .description
                .and_then(|d| d.en)
                .unwrap_or_default(),
            all_time_high: Self::extreme(&market.ath, &market.ath_date),
            all_time_low: Self::extreme(&market.atl, &market.atl_date),
            circulating_supply: market.circulating_supply,
            max_supply: market.max_supply,
            sector: None,
            industry: None,
            exchange: None,
            website: None,
            employees: None,
        })
    }

    fn history(&self, id: &str, range: TimeRange) -> Result<Vec<PricePoint>, FetchError> {
        let days = match range.days() {
            Some(d) => d.to_string(),
            None => "max".to_string(),
        };
        let url = format!("{BASE_URL}/coins/{id}/market_chart?vs_currency=usd&days={days}");
        let chart: MarketChart = get_json(&self.client, &self.breaker, &url, Some(id))?;

        let mut points: Vec<PricePoint> = chart
            .prices
            .into_iter()
            .filter_map(|(ts_ms, price)| {
                DateTime::<Utc>::from_timestamp_millis(ts_ms)
                    .map(|timestamp| PricePoint { timestamp, price })
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);

        if points.is_empty() {
            return Err(FetchError::Malformed(format!("{id}: empty price series")));
        }
        Ok(points)
    }

    fn is_available(&self) -> bool {
        self.breaker.is_allowed()
    }
}
