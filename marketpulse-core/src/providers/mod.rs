//! Provider trait, structured fetch errors, and shared HTTP plumbing.
//!
//! Providers are blocking REST clients meant to run off the UI thread. The
//! fallback layer sits above this trait — providers report failures, they
//! never substitute data themselves.

pub mod breaker;
pub mod coingecko;
pub mod equity;

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{AssetClass, DetailRecord, ListingRecord, PricePoint, TimeRange};

pub use breaker::CircuitBreaker;
pub use coingecko::CoinGeckoProvider;
pub use equity::EquityProvider;

/// Structured error taxonomy for data operations.
///
/// `Network`, `RateLimited`, `Malformed`, and `Blocked` are recoverable via
/// fallback substitution; `NotFound` surfaces as its own view state.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("not found: {id}")]
    NotFound { id: String },

    #[error("provider temporarily blocked (circuit breaker open)")]
    Blocked,
}

impl FetchError {
    /// Whether the fallback layer may substitute synthetic data for this
    /// error. `NotFound` is the only failure that must pass through.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FetchError::NotFound { .. })
    }
}

/// A market-data source for one asset class.
pub trait MarketProvider: Send + Sync {
    /// Human-readable provider name (for advisories and status lines).
    fn name(&self) -> &str;

    fn asset_class(&self) -> AssetClass;

    /// Current overview listings (one page, up to 100 records).
    fn listings(&self) -> Result<Vec<ListingRecord>, FetchError>;

    /// Full profile for a single entity.
    fn detail(&self, id: &str) -> Result<DetailRecord, FetchError>;

    /// Historical price series for the given range, ascending by timestamp.
    fn history(&self, id: &str, range: TimeRange) -> Result<Vec<PricePoint>, FetchError>;

    /// Whether the provider is currently willing to issue requests.
    fn is_available(&self) -> bool;
}

const MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("marketpulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// GET a JSON document with retry, backoff, and circuit-breaker accounting.
///
/// 403 trips the breaker immediately (treated as a ban); 429 records a
/// failure and retries after backoff; other non-2xx statuses count as
/// failures. `entity` names the record a 404 should be attributed to.
pub(crate) fn get_json<T: DeserializeOwned>(
    client: &reqwest::blocking::Client,
    breaker: &CircuitBreaker,
    url: &str,
    entity: Option<&str>,
) -> Result<T, FetchError> {
    if !breaker.is_allowed() {
        return Err(FetchError::Blocked);
    }

    let mut last_error = None;

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            std::thread::sleep(BASE_DELAY * 2u32.pow(attempt - 1));
            if !breaker.is_allowed() {
                return Err(FetchError::Blocked);
            }
        }

        let resp = match client.get(url).send() {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    last_error = Some(FetchError::Network(e.to_string()));
                    continue;
                }
                return Err(FetchError::Network(e.to_string()));
            }
        };

        let status = resp.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            breaker.trip();
            return Err(FetchError::Blocked);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            breaker.record_failure();
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            last_error = Some(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
            continue;
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = entity {
                return Err(FetchError::NotFound { id: id.to_string() });
            }
            breaker.record_failure();
            last_error = Some(FetchError::Network(format!("HTTP {status}")));
            continue;
        }

        if !status.is_success() {
            breaker.record_failure();
            last_error = Some(FetchError::Network(format!("HTTP {status}")));
            continue;
        }

        let body: T = resp
            .json()
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        breaker.record_success();
        return Ok(body);
    }

    Err(last_error.unwrap_or_else(|| FetchError::Network("max retries exceeded".into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_not_recoverable() {
        assert!(!FetchError::NotFound { id: "x".into() }.is_recoverable());
        assert!(FetchError::Network("down".into()).is_recoverable());
        assert!(FetchError::RateLimited {
            retry_after_secs: 60
        }
        .is_recoverable());
        assert!(FetchError::Malformed("missing field".into()).is_recoverable());
        assert!(FetchError::Blocked.is_recoverable());
    }
}
