//! Currency client: cached exchange rate lookups
//!
//! `CurrencyClient` answers "rates for (base, symbols)" from the on-disk cache
//! while the stored snapshot is within the TTL, and refetches otherwise. A
//! snapshot whose age equals the TTL exactly is still fresh.
//!
//! Upstream failures are never retried or masked with stale data: the error is
//! returned and the previously cached snapshot stays on disk as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::data::{FetchError, QueryError, RateQuery, RatesFetcher, RatesSnapshot, ReqwestTransport};
use crate::interval::Interval;

/// Base currency used when the caller does not name one
pub const DEFAULT_BASE: &str = "EUR";

/// Status code a successful upstream response must carry
pub const EXPECTED_STATUS: u16 = 200;

/// Errors returned by the currency client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// No cache directory was configured and none could be determined
    #[error("Could not determine a cache directory; set RATECACHE_DIR")]
    NoCacheDir,
}

/// How a lookup was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing usable was cached; fetched from upstream
    Miss,
    /// Served from cache without a network call
    Fresh,
    /// Cached snapshot was older than the TTL; refetched
    Stale,
}

impl CacheStatus {
    /// True when the lookup was answered without a network call
    pub fn is_hit(self) -> bool {
        self == CacheStatus::Fresh
    }
}

/// Rates snapshot returned by a lookup, with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct RatesResult {
    /// Cache key the snapshot is stored under
    pub key: String,
    pub snapshot: RatesSnapshot,
    pub status: CacheStatus,
}

impl RatesResult {
    /// Currency code to rate mapping of the snapshot
    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.snapshot.rates
    }
}

/// Exchange rate client backed by a file cache
#[derive(Debug)]
pub struct CurrencyClient {
    interval: Interval,
    fetcher: RatesFetcher,
    cache: CacheStore,
    clock: Arc<dyn Clock>,
}

impl CurrencyClient {
    /// Creates a client using the system clock
    pub fn new(fetcher: RatesFetcher, cache: CacheStore, interval: Interval) -> Self {
        Self {
            interval,
            fetcher,
            cache,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a client talking to the configured API over HTTP
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        let fetcher = RatesFetcher::new(config.api.clone(), Arc::new(transport));
        let cache = match &config.cache_dir {
            Some(dir) => CacheStore::with_dir(dir),
            None => CacheStore::new().ok_or(ClientError::NoCacheDir)?,
        };
        Ok(Self::new(fetcher, cache, config.ttl))
    }

    /// Replaces the time source used for freshness checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the current cache TTL
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Sets the cache TTL used by subsequent lookups
    pub fn set_interval(&mut self, interval: Interval) {
        self.interval = interval;
    }

    /// The cache store backing this client
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Returns rates for `symbols` against `base`, from cache when fresh
    ///
    /// # Behavior
    /// - No cached entry (or an unreadable one): fetch, store, return `Miss`
    /// - Cached and `now - timestamp <= ttl`: return it as `Fresh`, no network call
    /// - Cached but older: fetch, overwrite, return `Stale`
    ///
    /// Upstream errors propagate unchanged and leave the cache untouched.
    pub async fn get_currency<I, S>(&self, base: &str, symbols: I) -> Result<RatesResult, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query = RateQuery::new(base, symbols)?;
        let key = query.cache_key();

        match self.cache.read::<RatesSnapshot>(&key) {
            Ok(snapshot) if self.is_fresh(&snapshot) => {
                debug!(key = %key, "serving rates from cache");
                Ok(RatesResult {
                    key,
                    snapshot,
                    status: CacheStatus::Fresh,
                })
            }
            Ok(snapshot) => {
                debug!(key = %key, timestamp = snapshot.timestamp, "cached rates are stale");
                self.refresh(&query, key, CacheStatus::Stale).await
            }
            Err(CacheError::NotFound(_)) => {
                debug!(key = %key, "no cached rates");
                self.refresh(&query, key, CacheStatus::Miss).await
            }
            Err(CacheError::Serialization(e)) => {
                warn!(key = %key, error = %e, "discarding unreadable cache entry");
                self.refresh(&query, key, CacheStatus::Miss).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `get_currency` against the default base currency
    pub async fn get_currency_default<I, S>(&self, symbols: I) -> Result<RatesResult, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.get_currency(DEFAULT_BASE, symbols).await
    }

    /// Deletes the cached snapshot for `(base, symbols)`
    ///
    /// # Returns
    /// * `Ok(key)` - The normalized cache key that was removed
    /// * `Err(ClientError::Cache(CacheError::NotFound))` - If nothing is cached
    pub fn clear_cache<I, S>(&self, base: &str, symbols: I) -> Result<String, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = RateQuery::new(base, symbols)?.cache_key();
        self.cache.delete(&key)?;
        info!(key = %key, "cleared cached rates");
        Ok(key)
    }

    /// `clear_cache` against the default base currency
    pub fn clear_cache_default<I, S>(&self, symbols: I) -> Result<String, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear_cache(DEFAULT_BASE, symbols)
    }

    fn is_fresh(&self, snapshot: &RatesSnapshot) -> bool {
        match snapshot.age_at(self.clock.now()) {
            Some(age) => age <= self.interval.as_duration(),
            None => false,
        }
    }

    async fn refresh(
        &self,
        query: &RateQuery,
        key: String,
        status: CacheStatus,
    ) -> Result<RatesResult, ClientError> {
        let snapshot = self.fetcher.fetch(query, EXPECTED_STATUS).await?;
        self.cache.write(&key, &snapshot)?;
        info!(key = %key, rates = snapshot.rates.len(), "stored fresh rates");
        Ok(RatesResult {
            key,
            snapshot,
            status,
        })
    }
}
