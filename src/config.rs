//! Configuration Module
//!
//! Loads API and cache settings from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::interval::Interval;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "api.exchangeratesapi.io";
const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Location and credential of the upstream rates API
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    scheme: String,
    host: String,
    api_version: String,
    access_key: String,
}

impl ApiConfig {
    /// Creates an API config from its parts
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        api_version: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            api_version: api_version.into(),
            access_key: access_key.into(),
        }
    }

    /// Default public endpoint with the given access key
    pub fn with_access_key(access_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_SCHEME, DEFAULT_HOST, DEFAULT_API_VERSION, access_key)
    }

    /// `{scheme}://{host}/{api_version}`
    pub fn base_url(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.host, self.api_version)
    }

    /// The API access key sent with every request
    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Full client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API settings
    pub api: ApiConfig,
    /// Cache root; `None` means the platform cache directory
    pub cache_dir: Option<PathBuf>,
    /// Maximum age of a cached snapshot still served without refetching
    pub ttl: Interval,
    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new Config from the process environment.
    ///
    /// # Environment Variables
    /// - `SCHEME` - Request scheme (default: http)
    /// - `HOST` - API host (default: api.exchangeratesapi.io)
    /// - `API_VERSION` - API version path segment (default: v1)
    /// - `ACCESS_KEY` - API access key (required)
    /// - `RATECACHE_DIR` - Cache root (default: platform cache directory)
    /// - `RATECACHE_TTL` - Cache TTL such as `60m` or `1h30m` (default: 0s)
    /// - `RATECACHE_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty variables count as unset
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let access_key = lookup("ACCESS_KEY").ok_or(ConfigError::MissingVar("ACCESS_KEY"))?;

        let api = ApiConfig::new(
            var("SCHEME", DEFAULT_SCHEME),
            var("HOST", DEFAULT_HOST),
            var("API_VERSION", DEFAULT_API_VERSION),
            access_key,
        );

        let ttl = match lookup("RATECACHE_TTL") {
            Some(value) => value.parse::<Interval>().map_err(|_| ConfigError::InvalidValue {
                var: "RATECACHE_TTL",
                value,
            })?,
            None => Interval::ZERO,
        };

        let request_timeout = match lookup("RATECACHE_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    var: "RATECACHE_TIMEOUT_SECS",
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api,
            cache_dir: lookup("RATECACHE_DIR").map(PathBuf::from),
            ttl,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("ACCESS_KEY", "abc")])).unwrap();

        assert_eq!(config.api.base_url(), "http://api.exchangeratesapi.io/v1");
        assert_eq!(config.api.access_key(), "abc");
        assert!(config.cache_dir.is_none());
        assert_eq!(config.ttl, Interval::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("ACCESS_KEY", "abc"),
            ("SCHEME", "https"),
            ("HOST", "localhost:8080"),
            ("API_VERSION", "v2"),
            ("RATECACHE_DIR", "/tmp/rates"),
            ("RATECACHE_TTL", "1h"),
            ("RATECACHE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url(), "https://localhost:8080/v2");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/rates")));
        assert_eq!(config.ttl.num_seconds(), 3600);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_requires_access_key() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingVar("ACCESS_KEY"));

        let result = Config::from_lookup(lookup_from(&[("ACCESS_KEY", "")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_empty_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("ACCESS_KEY", "abc"),
            ("SCHEME", ""),
            ("HOST", ""),
            ("API_VERSION", ""),
            ("RATECACHE_DIR", ""),
            ("RATECACHE_TTL", ""),
            ("RATECACHE_TIMEOUT_SECS", ""),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url(), "http://api.exchangeratesapi.io/v1");
        assert!(config.cache_dir.is_none());
        assert_eq!(config.ttl, Interval::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_rejects_bad_ttl() {
        let result = Config::from_lookup(lookup_from(&[
            ("ACCESS_KEY", "abc"),
            ("RATECACHE_TTL", "soon"),
        ]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidValue {
                var: "RATECACHE_TTL",
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_api_config_debug_redacts_key() {
        let api = ApiConfig::with_access_key("super-secret");
        let debug = format!("{:?}", api);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
