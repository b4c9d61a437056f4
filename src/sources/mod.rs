//! Exchange rate sources
//!
//! - Proxy: the expense tracker's own backend, `GET /exchange-rate`
//! - exchangerate.host: public fallback service
//! - Static: a fixed table, for offline runs and tests
//!
//! Every source reports rates relative to USD.

pub mod exchangerate_host;
pub mod proxy;

pub use exchangerate_host::ExchangeRateHostSource;
pub use proxy::{ProxyPayload, ProxyRateSource};

use crate::currency::Currency;
use crate::error::{FxError, Result};
use crate::fx::RateTable;
use reqwest::Client;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Timeout applied to every rate request unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Trait for USD-based exchange rate sources
pub trait RateSource: Send + Sync {
    /// Fetch units-per-USD rates for the given currencies
    fn fetch_rates(
        &self,
        symbols: &[Currency],
    ) -> impl Future<Output = Result<RateTable>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FxError::RateFetch(format!("Failed to create HTTP client: {}", e)))
}

/// Build a table from a code -> rate mapping reported against USD
///
/// Codes outside the supported set are skipped. USD is always 1.0, whatever
/// the source reported for it. A mapping that leaves any supported currency
/// without a rate is rejected, so the caller moves on to the next source.
pub(crate) fn table_from_mapping(mapping: &BTreeMap<String, f64>) -> Result<RateTable> {
    let mut entries = Vec::with_capacity(Currency::ALL.len());
    for (code, rate) in mapping {
        match Currency::from_code(code) {
            Some(Currency::BASE) => {
                if *rate != 1.0 {
                    log::debug!("Ignoring reported {} rate {}, base is 1.0", code, rate);
                }
            }
            Some(currency) => entries.push((currency, *rate)),
            None => log::debug!("Ignoring unsupported currency {} in rate response", code),
        }
    }
    entries.push((Currency::BASE, 1.0));

    let table = RateTable::from_entries(entries)?;
    let missing = table.missing();
    if !missing.is_empty() {
        return Err(FxError::RateFetch(format!(
            "Response has no rate for {}",
            Currency::joined_codes(&missing)
        )));
    }
    Ok(table)
}

/// Source serving a fixed table, or always failing when built unavailable
#[derive(Debug, Default)]
pub struct StaticRateSource {
    table: Option<RateTable>,
    fetches: AtomicUsize,
}

impl StaticRateSource {
    pub fn new(table: RateTable) -> Self {
        Self {
            table: Some(table),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source that fails every fetch, as if the network were down
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Number of fetches attempted so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl RateSource for StaticRateSource {
    fn fetch_rates(
        &self,
        symbols: &[Currency],
    ) -> impl Future<Output = Result<RateTable>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = match &self.table {
            Some(table) => {
                let entries = table.iter().filter(|(c, _)| symbols.contains(c));
                RateTable::from_entries(entries)
            }
            None => Err(FxError::RateFetch("Static source is unavailable".to_string())),
        };
        std::future::ready(result)
    }

    fn name(&self) -> &str {
        "static"
    }
}
