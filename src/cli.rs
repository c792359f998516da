//! Command-line interface parsing for ratecache
//!
//! This module handles parsing of CLI arguments using clap and formatting of
//! lookup results for the terminal.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::client::{CacheStatus, RatesResult, DEFAULT_BASE};
use crate::interval::Interval;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The TTL argument is not a valid interval
    #[error("Invalid TTL: '{0}'. Use e.g. 90s, 60m, 1h30m, 2d, 1w")]
    InvalidTtl(String),
}

/// ratecache - cached currency exchange rates
#[derive(Parser, Debug)]
#[command(name = "ratecache")]
#[command(about = "Currency exchange rates with an on-disk cache")]
#[command(version)]
pub struct Cli {
    /// Cache directory (overrides RATECACHE_DIR)
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print rates, serving from cache while it is fresh
    ///
    /// Examples:
    ///   ratecache get USD RUB           # EUR -> USD, RUB
    ///   ratecache get usd --base GBP    # GBP -> USD
    ///   ratecache get --ttl 1h          # full table, cached for an hour
    Get {
        /// Currency codes to compare against the base (all when omitted)
        symbols: Vec<String>,

        /// Base currency
        #[arg(long, default_value = DEFAULT_BASE)]
        base: String,

        /// Cache TTL (overrides RATECACHE_TTL)
        #[arg(long, value_parser = parse_ttl_arg)]
        ttl: Option<Interval>,
    },

    /// Delete the cached rates for a base and symbol set
    Clear {
        /// Currency codes of the cached lookup
        symbols: Vec<String>,

        /// Base currency
        #[arg(long, default_value = DEFAULT_BASE)]
        base: String,
    },
}

/// Parses a TTL argument into an Interval.
///
/// # Returns
/// * `Ok(Interval)` if the string is a valid non-negative interval
/// * `Err(CliError::InvalidTtl)` otherwise
pub fn parse_ttl_arg(s: &str) -> Result<Interval, CliError> {
    s.parse().map_err(|_| CliError::InvalidTtl(s.to_string()))
}

/// Renders a lookup as one `CODE<TAB>rate` line per currency, preceded by a
/// header naming the base and whether the cache answered.
pub fn format_rates(result: &RatesResult) -> String {
    let source = match result.status {
        CacheStatus::Fresh => "cached",
        CacheStatus::Miss | CacheStatus::Stale => "fetched",
    };
    let base = if result.snapshot.base.is_empty() {
        result.key.split('-').next().unwrap_or_default()
    } else {
        result.snapshot.base.as_str()
    };

    let mut out = format!("{} rates ({}, timestamp {})\n", base, source, result.snapshot.timestamp);
    for (code, rate) in result.rates() {
        let _ = writeln!(out, "{}\t{}", code, rate);
    }
    out
}
