//! Backend proxy rate source
//!
//! The expense tracker's backend exposes `GET /exchange-rate?base=..&target=..`.
//! Its response shape is loosely defined upstream: sometimes a single pair
//! `{ "rate": 25400.0, "target": "VND" }`, sometimes a full mapping. Responses
//! are parsed into [`ProxyPayload`] and handled per variant.

use super::{http_client, table_from_mapping, RateSource, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::currency::Currency;
use crate::error::{FxError, Result};
use crate::fx::RateTable;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Default location of the backend exchange-rate endpoint
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8080/api/exchange-rate";

/// Response of the backend exchange-rate endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProxyPayload {
    /// One USD -> target pair
    SingleRate { target: String, rate: f64 },
    /// Several rates against USD
    FullTable {
        #[serde(alias = "rate")]
        rates: BTreeMap<String, f64>,
    },
    Unrecognized(serde_json::Value),
}

impl ProxyPayload {
    /// Turn the payload into a rate table
    ///
    /// A single pair yields a table holding only that target and USD. The
    /// other currencies stay absent, and conversions involving them fail with
    /// `IncompleteRateTable`.
    pub fn into_table(self) -> Result<RateTable> {
        match self {
            ProxyPayload::SingleRate { target, rate } => {
                let target: Currency = target.parse().map_err(|_| {
                    FxError::RateFetch(format!("Proxy returned unsupported target {}", target))
                })?;
                let mut entries = vec![(Currency::BASE, 1.0)];
                if target != Currency::BASE {
                    entries.push((target, rate));
                }
                RateTable::from_entries(entries)
            }
            ProxyPayload::FullTable { rates } => table_from_mapping(&rates),
            ProxyPayload::Unrecognized(value) => Err(FxError::RateFetch(format!(
                "Unrecognized proxy response: {}",
                value
            ))),
        }
    }
}

/// Rate source backed by the expense tracker's backend
pub struct ProxyRateSource {
    url: String,
    client: Client,
}

impl ProxyRateSource {
    /// Create a new proxy source with the default request timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: http_client(timeout)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, symbols: &[Currency]) -> Result<RateTable> {
        let targets = Currency::joined_codes(symbols);
        let response = self
            .client
            .get(&self.url)
            .query(&[("base", Currency::BASE.code()), ("target", targets.as_str())])
            .send()
            .await
            .map_err(|e| FxError::RateFetch(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FxError::RateFetch(format!(
                "Proxy returned error: {}",
                response.status()
            )));
        }

        let payload: ProxyPayload = response
            .json()
            .await
            .map_err(|e| FxError::RateFetch(format!("JSON parse error: {}", e)))?;

        payload.into_table()
    }
}

impl RateSource for ProxyRateSource {
    fn fetch_rates(
        &self,
        symbols: &[Currency],
    ) -> impl Future<Output = Result<RateTable>> + Send {
        self.request(symbols)
    }

    fn name(&self) -> &str {
        "proxy"
    }
}
