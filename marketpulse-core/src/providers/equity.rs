//! Equity client — watchlist quotes via FMP, profiles and daily series via
//! Alpha Vantage.
//!
//! Two quirks shape this module. FMP serves a whole watchlist in one batch
//! quote call. Alpha Vantage encodes every number as a string under keys
//! like `"05. price"`, answers unknown symbols with an empty object, and
//! signals rate limiting with an HTTP 200 carrying a `Note` field.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use super::{get_json, CircuitBreaker, FetchError, MarketProvider};
use crate::model::{
    AssetClass, DetailRecord, ListingRecord, PriceExtreme, PricePoint, TimeRange,
};

const FMP_BASE: &str = "https://financialmodelingprep.com/api/v3";
const AV_BASE: &str = "https://www.alphavantage.co/query";
const API_KEY: &str = "demo";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpQuote {
    symbol: String,
    name: Option<String>,
    price: Option<f64>,
    changes_percentage: Option<f64>,
    market_cap: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Overview {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "Exchange")]
    exchange: Option<String>,
    #[serde(rename = "OfficialSite")]
    website: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_cap: Option<String>,
    #[serde(rename = "52WeekHigh")]
    week52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    week52_low: Option<String>,
    #[serde(rename = "SharesOutstanding")]
    shares_outstanding: Option<String>,
    #[serde(rename = "FullTimeEmployees")]
    employees: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailySeriesEnvelope {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<std::collections::BTreeMap<String, DailyBar>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: Option<String>,
}

/// Alpha Vantage free tier: 25 calls/day, communicated via a 200 + note.
fn rate_limit_note(note: Option<&String>, info: Option<&String>) -> Option<FetchError> {
    if note.is_some() || info.is_some() {
        Some(FetchError::RateLimited {
            retry_after_secs: 60,
        })
    } else {
        None
    }
}

fn parse_num(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .map(|s| s.trim().trim_end_matches('%'))
        .and_then(|s| s.parse::<f64>().ok())
}

pub struct EquityProvider {
    client: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
    watchlist: Vec<String>,
}

impl EquityProvider {
    pub fn new(breaker: Arc<CircuitBreaker>, watchlist: Vec<String>) -> Self {
        Self {
            client: super::build_client(),
            breaker,
            watchlist,
        }
    }

    fn overview(&self, symbol: &str) -> Result<Overview, FetchError> {
        let url = format!("{AV_BASE}?function=OVERVIEW&symbol={symbol}&apikey={API_KEY}");
        let overview: Overview = get_json(&self.client, &self.breaker, &url, Some(symbol))?;
        if let Some(err) = rate_limit_note(overview.note.as_ref(), None) {
            return Err(err);
        }
        Ok(overview)
    }
}

impl MarketProvider for EquityProvider {
    fn name(&self) -> &str {
        "equities"
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Equity
    }

    fn listings(&self) -> Result<Vec<ListingRecord>, FetchError> {
        if self.watchlist.is_empty() {
            return Ok(Vec::new());
        }
        let symbols = self.watchlist.join(",");
        let url = format!("{FMP_BASE}/quote/{symbols}?apikey={API_KEY}");
        let quotes: Vec<FmpQuote> = get_json(&self.client, &self.breaker, &url, None)?;

        Ok(quotes
            .into_iter()
            .map(|q| ListingRecord {
                id: q.symbol.clone(),
                name: q.name.unwrap_or_else(|| q.symbol.clone()),
                symbol: q.symbol,
                price: q.price.unwrap_or(0.0),
                change_pct_24h: q.changes_percentage.unwrap_or(0.0),
                market_cap: q.market_cap,
                volume: q.volume.unwrap_or(0.0),
            })
            .collect())
    }

    fn detail(&self, id: &str) -> Result<DetailRecord, FetchError> {
        let url = format!("{AV_BASE}?function=GLOBAL_QUOTE&symbol={id}&apikey={API_KEY}");
        let envelope: GlobalQuoteEnvelope = get_json(&self.client, &self.breaker, &url, Some(id))?;
        if let Some(err) =
            rate_limit_note(envelope.note.as_ref(), envelope.information.as_ref())
        {
            return Err(err);
        }

        // Unknown symbols come back as `{"Global Quote": {}}`.
        let quote = envelope.quote.unwrap_or_default();
        if quote.symbol.is_none() && quote.price.is_none() {
            return Err(FetchError::NotFound { id: id.to_string() });
        }
        let price = parse_num(&quote.price)
            .ok_or_else(|| FetchError::Malformed(format!("{id}: unparseable quote price")))?;

        let overview = self.overview(id)?;
        let extreme = |raw: &Option<String>| {
            parse_num(raw).map(|price| PriceExtreme { price, date: None })
        };

        Ok(DetailRecord {
            listing: ListingRecord {
                id: id.to_string(),
                name: overview.name.clone().unwrap_or_else(|| id.to_string()),
                symbol: quote.symbol.unwrap_or_else(|| id.to_string()),
                price,
                change_pct_24h: parse_num(&quote.change_percent).unwrap_or(0.0),
                market_cap: parse_num(&overview.market_cap),
                volume: parse_num(&quote.volume).unwrap_or(0.0),
            },
            description: overview.description.unwrap_or_default(),
            all_time_high: extreme(&overview.week52_high),
            all_time_low: extreme(&overview.week52_low),
            circulating_supply: parse_num(&overview.shares_outstanding),
            max_supply: None,
            sector: overview.sector,
            industry: overview.industry,
            exchange: overview.exchange,
            website: overview.website,
            employees: parse_num(&overview.employees).map(|n| n as u64),
        })
    }

    fn history(&self, id: &str, range: TimeRange) -> Result<Vec<PricePoint>, FetchError> {
        // Compact covers the last 100 trading days; anything longer needs the
        // full series, trimmed client-side.
        let outputsize = match range.days() {
            Some(d) if d <= 100 => "compact",
            _ => "full",
        };
        let url = format!(
            "{AV_BASE}?function=TIME_SERIES_DAILY&symbol={id}&outputsize={outputsize}\
             &apikey={API_KEY}"
        );
        let envelope: DailySeriesEnvelope = get_json(&self.client, &self.breaker, &url, Some(id))?;
        if let Some(err) =
            rate_limit_note(envelope.note.as_ref(), envelope.information.as_ref())
        {
            return Err(err);
        }
        let series = envelope
            .series
            .ok_or_else(|| FetchError::NotFound { id: id.to_string() })?;

        let cutoff = range
            .days()
            .map(|days| Utc::now() - chrono::Duration::days(days as i64));

        let mut points: Vec<PricePoint> = series
            .into_iter()
            .filter_map(|(date, bar)| {
                let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
                let timestamp = Utc
                    .from_utc_datetime(&day.and_hms_opt(0, 0, 0)?);
                let price = parse_num(&bar.close)?;
                Some(PricePoint { timestamp, price })
            })
            .filter(|p| cutoff.map_or(true, |c| p.timestamp >= c))
            .collect();
        points.sort_by_key(|p| p.timestamp);

        if points.is_empty() {
            return Err(FetchError::Malformed(format!("{id}: empty daily series")));
        }
        Ok(points)
    }

    fn is_available(&self) -> bool {
        self.breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmp_quote_row_parses() {
        let json = r#"{
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 187.32,
            "changesPercentage": 0.67,
            "marketCap": 2950000000000.0,
            "volume": 58900000
        }"#;
        let q: FmpQuote = serde_json::from_str(json).unwrap();
        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.changes_percentage, Some(0.67));
    }

    #[test]
    fn global_quote_strings_parse_to_numbers() {
        let json = r#"{
            "Global Quote": {
                "01. symbol": "MSFT",
                "05. price": "418.5600",
                "06. volume": "19234567",
                "10. change percent": "-0.5600%"
            }
        }"#;
        let env: GlobalQuoteEnvelope = serde_json::from_str(json).unwrap();
        let quote = env.quote.unwrap();
        assert_eq!(parse_num(&quote.price), Some(418.56));
        assert_eq!(parse_num(&quote.change_percent), Some(-0.56));
    }

    #[test]
    fn empty_global_quote_means_unknown_symbol() {
        let json = r#"{"Global Quote": {}}"#;
        let env: GlobalQuoteEnvelope = serde_json::from_str(json).unwrap();
        let quote = env.quote.unwrap();
        assert!(quote.symbol.is_none() && quote.price.is_none());
    }

    #[test]
    fn note_body_is_rate_limit() {
        let json = r#"{"Note": "Thank you for using Alpha Vantage!"}"#;
        let env: GlobalQuoteEnvelope = serde_json::from_str(json).unwrap();
        assert!(matches!(
            rate_limit_note(env.note.as_ref(), env.information.as_ref()),
            Some(FetchError::RateLimited { .. })
        ));
    }

    #[test]
    fn daily_series_parses_and_keys_by_date() {
        let json = r#"{
            "Time Series (Daily)": {
                "2026-08-25": {"4. close": "187.3200"},
                "2026-08-24": {"4. close": "186.1000"}
            }
        }"#;
        let env: DailySeriesEnvelope = serde_json::from_str(json).unwrap();
        let series = env.series.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(parse_num(&series["2026-08-25"].close), Some(187.32));
    }
}
