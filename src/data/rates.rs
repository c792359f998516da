//! Exchange rates API client
//!
//! This module builds requests against an exchangeratesapi.io-style endpoint,
//! checks the response status, and parses the body into a `RatesSnapshot`.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use super::transport::Transport;
use super::{RateQuery, RatesSnapshot};
use crate::config::ApiConfig;

/// Endpoint returning the most recent rates table
pub const LATEST_ENDPOINT: &str = "latest";

/// Fields a payload must carry to be cached
const REQUIRED_FIELDS: [&str; 2] = ["timestamp", "rates"];

/// Errors that can occur when fetching rates
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a status other than the expected one
    #[error("Unexpected status code: {actual} (expected {expected})")]
    UnexpectedStatus { actual: u16, expected: u16 },

    /// Upstream body is not a usable rates payload
    #[error("Malformed rates payload: {0}")]
    MalformedPayload(String),
}

/// Client for fetching rate tables from the upstream API
#[derive(Debug, Clone)]
pub struct RatesFetcher {
    transport: Arc<dyn Transport>,
    api: ApiConfig,
    endpoint: String,
}

impl RatesFetcher {
    /// Creates a fetcher for the `latest` endpoint
    pub fn new(api: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api,
            endpoint: LATEST_ENDPOINT.to_string(),
        }
    }

    /// Targets a different endpoint (e.g. a historical date)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Endpoint path segment requested after the API version
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint URL without query string; safe to log
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.api.base_url(), self.endpoint)
    }

    /// Full request URL including the access key
    pub fn request_url(&self, query: &RateQuery) -> String {
        let mut url = format!(
            "{}?access_key={}&base={}",
            self.endpoint_url(),
            urlencoding::encode(self.api.access_key()),
            query.base()
        );
        if let Some(symbols) = query.symbols_param() {
            url.push_str("&symbols=");
            url.push_str(&symbols);
        }
        url
    }

    /// Fetches the rates table for `query`
    ///
    /// # Arguments
    /// * `query` - Normalized base and symbols
    /// * `expected_status` - Status code that counts as success (normally 200)
    ///
    /// # Returns
    /// * `Ok(RatesSnapshot)` - The parsed payload
    /// * `Err(FetchError::UnexpectedStatus)` - If the status differs from `expected_status`
    /// * `Err(FetchError::MalformedPayload)` - If `timestamp` or `rates` is missing
    pub async fn fetch(
        &self,
        query: &RateQuery,
        expected_status: u16,
    ) -> Result<RatesSnapshot, FetchError> {
        let response = self.transport.get(&self.request_url(query)).await?;

        if response.status != expected_status {
            error!(
                url = %self.endpoint_url(),
                status = response.status,
                expected = expected_status,
                "rates request returned unexpected status"
            );
            return Err(FetchError::UnexpectedStatus {
                actual: response.status,
                expected: expected_status,
            });
        }

        info!("{} - GET - {}", self.endpoint_url(), response.status);
        parse_payload(&response.body)
    }
}

/// Parses an upstream body, requiring `timestamp` and `rates`
fn parse_payload(body: &str) -> Result<RatesSnapshot, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedPayload(format!("body is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| FetchError::MalformedPayload("body is not a JSON object".to_string()))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        let detail = upstream_error(&value)
            .map(|msg| format!(" (upstream error: {})", msg))
            .unwrap_or_default();
        return Err(FetchError::MalformedPayload(format!(
            "missing field '{}'{}",
            missing, detail
        )));
    }

    serde_json::from_value(value).map_err(|e| FetchError::MalformedPayload(e.to_string()))
}

/// Extracts the message from an `{"error": {"type": .., "info": ..}}` body
fn upstream_error(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    error
        .get("info")
        .or_else(|| error.get("type"))
        .or_else(|| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
