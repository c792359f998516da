//! Core data models for exchange rate lookups
//!
//! This module contains the validated request type (`RateQuery`), the cached
//! artifact (`RatesSnapshot`), and the fetcher that talks to the upstream API.

pub mod rates;
pub mod transport;

pub use rates::{FetchError, RatesFetcher, LATEST_ENDPOINT};
pub use transport::{HttpResponse, ReqwestTransport, Transport};

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while building a rate query
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A currency code was empty or contained non-alphanumeric characters
    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),
}

/// A normalized `(base, symbols)` request
///
/// Codes are upper-cased, and symbols are sorted and de-duplicated, so that
/// `["usd", "RUB"]` and `["rub", "USD", "usd"]` describe the same query and map
/// to the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    base: String,
    symbols: Vec<String>,
}

impl RateQuery {
    /// Builds a query from a base currency and any number of comparison symbols
    ///
    /// # Returns
    /// * `Ok(RateQuery)` with normalized codes
    /// * `Err(QueryError::InvalidCurrency)` if any code is empty or not ASCII alphanumeric
    pub fn new<I, S>(base: &str, symbols: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base = normalize_code(base)?;
        let mut symbols = symbols
            .into_iter()
            .map(|s| normalize_code(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        symbols.sort();
        symbols.dedup();

        Ok(Self { base, symbols })
    }

    /// The upper-cased base currency
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The upper-cased, sorted comparison symbols
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Comma-joined symbol list for the request, or `None` for the full table
    pub fn symbols_param(&self) -> Option<String> {
        if self.symbols.is_empty() {
            None
        } else {
            Some(self.symbols.join(","))
        }
    }

    /// Deterministic cache key, e.g. `EUR-RUB,USD` (or `EUR-` with no symbols)
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.base, self.symbols.join(","))
    }
}

fn normalize_code(code: &str) -> Result<String, QueryError> {
    let trimmed = code.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(QueryError::InvalidCurrency(code.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// One fetched rates table, stored verbatim in the cache
///
/// Only `timestamp` and `rates` are required. Every other upstream field
/// (`success`, `date`, ...) is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesSnapshot {
    /// Upstream snapshot time in epoch seconds, used for freshness checks
    pub timestamp: i64,
    /// Base currency reported by the upstream
    #[serde(default)]
    pub base: String,
    /// Currency code to rate relative to `base`
    pub rates: BTreeMap<String, f64>,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RatesSnapshot {
    /// The snapshot time as a UTC datetime, if the timestamp is representable
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// How old the snapshot is at `now`; negative if it is from the future
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at().map(|fetched| now.signed_duration_since(fetched))
    }

    /// Rate for a single currency code (case-insensitive)
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_ascii_uppercase()).copied()
    }
}
