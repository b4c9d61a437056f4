//! exchangerate.host fallback source
//!
//! Public service queried as `GET /latest?base=USD&symbols=VND,USD,EUR,JPY`,
//! answering `{ "rates": { "VND": ..., ... } }`.

use super::{http_client, table_from_mapping, RateSource, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::currency::Currency;
use crate::error::{FxError, Result};
use crate::fx::RateTable;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

pub const EXCHANGERATE_HOST_URL: &str = "https://api.exchangerate.host/latest";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    rates: Option<BTreeMap<String, f64>>,
}

impl LatestResponse {
    fn into_table(self) -> Result<RateTable> {
        let rates = self.rates.ok_or_else(|| {
            FxError::RateFetch("exchangerate.host response has no rates".to_string())
        })?;
        table_from_mapping(&rates)
    }
}

/// Public exchange-rate service (no API key required)
pub struct ExchangeRateHostSource {
    url: String,
    client: Client,
}

impl ExchangeRateHostSource {
    /// Create a source pointing at the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_url(
            EXCHANGERATE_HOST_URL,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: http_client(timeout)?,
        })
    }

    async fn request(&self, symbols: &[Currency]) -> Result<RateTable> {
        let symbols = Currency::joined_codes(symbols);
        let response = self
            .client
            .get(&self.url)
            .query(&[("base", Currency::BASE.code()), ("symbols", symbols.as_str())])
            .send()
            .await
            .map_err(|e| FxError::RateFetch(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FxError::RateFetch(format!(
                "exchangerate.host returned error: {}",
                response.status()
            )));
        }

        let data: LatestResponse = response
            .json()
            .await
            .map_err(|e| FxError::RateFetch(format!("JSON parse error: {}", e)))?;

        data.into_table()
    }
}

impl RateSource for ExchangeRateHostSource {
    fn fetch_rates(
        &self,
        symbols: &[Currency],
    ) -> impl Future<Output = Result<RateTable>> + Send {
        self.request(symbols)
    }

    fn name(&self) -> &str {
        "exchangerate.host"
    }
}
