//! ratecache library
//!
//! Fetches currency exchange rates from an exchangeratesapi.io-style HTTP API
//! and caches each response as a JSON file until its TTL runs out.

pub mod cache;
pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod data;
pub mod interval;

pub use cache::{CacheError, CacheStore};
pub use client::{CacheStatus, ClientError, CurrencyClient, RatesResult, DEFAULT_BASE};
pub use config::{ApiConfig, Config, ConfigError};
pub use data::{FetchError, RateQuery, RatesFetcher, RatesSnapshot};
pub use interval::{Interval, IntervalError, IntervalParts};
