//! Currency service: cached rates, conversion and the preferred currency
//!
//! Rates are fetched on demand. A fresh cached table is returned without
//! touching the network or suspending. When the cache is stale, one caller
//! refreshes it while the others wait on the same refresh, then read the
//! installed table.
//!
//! Refresh order: primary source, fallback source, then the hardcoded
//! [`DEFAULT_RATES`](super::DEFAULT_RATES). A refresh always installs a whole
//! table, so callers never see a mix of old and new rates.

use super::cache::{CachedRates, DEFAULT_TTL_SECS};
use super::table::{RateOrigin, RateTable};
use crate::clock::{Clock, SystemClock};
use crate::currency::Currency;
use crate::error::Result;
use crate::format;
use crate::preference::PreferenceStore;
use crate::sources::RateSource;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// Preference store key holding the preferred currency code
pub const PREFERENCE_KEY: &str = "preferredCurrency";

pub struct CurrencyService<P, F> {
    primary: P,
    fallback: F,
    preferences: Box<dyn PreferenceStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cache: RwLock<Option<CachedRates>>,
    /// Held for the whole of a refresh
    refresh: Mutex<()>,
    preferred: RwLock<Currency>,
}

impl<P: RateSource, F: RateSource> CurrencyService<P, F> {
    /// Create a service and read the stored currency preference
    pub fn new(primary: P, fallback: F, preferences: Box<dyn PreferenceStore>) -> Self {
        let preferred = load_preference(preferences.as_ref());
        Self {
            primary,
            fallback,
            preferences,
            clock: Arc::new(SystemClock),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
            preferred: RwLock::new(preferred),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Current best-known rate table, refreshing it when stale
    ///
    /// Never fails: when every source is down the default table is installed.
    pub async fn get_rates(&self) -> Arc<RateTable> {
        if let Some(table) = self.fresh_table() {
            return table;
        }

        let _refreshing = self.refresh.lock().await;
        // another caller may have refreshed while we waited
        if let Some(table) = self.fresh_table() {
            log::debug!("Reusing rates refreshed by a concurrent caller");
            return table;
        }

        let (table, origin) = self.fetch_table().await;
        let cached = CachedRates::new(table, self.clock.now(), origin);
        let table = Arc::clone(&cached.table);
        log::info!(
            "Installed {} rate table with {} entries",
            origin,
            table.len()
        );
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(cached);
        table
    }

    /// Convert `amount` from one currency to another through USD
    pub async fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<f64> {
        if from == to {
            return Ok(amount);
        }
        let rates = self.get_rates().await;
        rates.convert(amount, from, to).map_err(|e| {
            log::warn!("Cannot convert {} -> {}: {}", from, to, e);
            e
        })
    }

    /// Convert into the currently preferred currency
    pub async fn convert_to_preferred(&self, amount: f64, from: Currency) -> Result<f64> {
        self.convert(amount, from, self.get_preferred_currency()).await
    }

    /// Sum amounts held in mixed currencies, expressed in `to`
    ///
    /// Rates are fetched at most once for the whole batch.
    pub async fn convert_all(&self, amounts: &[(f64, Currency)], to: Currency) -> Result<f64> {
        if amounts.iter().all(|(_, currency)| *currency == to) {
            return Ok(amounts.iter().map(|(amount, _)| amount).sum());
        }
        let rates = self.get_rates().await;
        amounts
            .iter()
            .map(|(amount, from)| rates.convert(*amount, *from, to))
            .sum()
    }

    /// Format an amount for display in the given currency
    pub fn format_currency(&self, amount: f64, currency: Currency) -> String {
        format::format_currency(amount, currency)
    }

    pub fn get_preferred_currency(&self) -> Currency {
        *self.preferred.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the preferred currency from a user-supplied code
    ///
    /// Unsupported codes are rejected and leave the preference untouched.
    pub fn set_preferred_currency(&self, code: &str) -> Result<Currency> {
        let currency: Currency = code.parse().map_err(|e| {
            log::warn!("Rejected preferred currency {:?}", code);
            e
        })?;
        self.set_preferred(currency);
        Ok(currency)
    }

    /// Change the preferred currency and persist it
    ///
    /// A failed write is logged; the new preference still applies for the
    /// rest of the session.
    pub fn set_preferred(&self, currency: Currency) {
        *self.preferred.write().unwrap_or_else(|e| e.into_inner()) = currency;
        if let Err(e) = self.preferences.save(PREFERENCE_KEY, currency.code()) {
            log::warn!("Could not persist preferred currency {}: {}", currency, e);
        }
    }

    /// Origin of the cached table, if one has been fetched
    pub fn cached_origin(&self) -> Option<RateOrigin> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|cached| cached.origin)
    }

    /// When the cached table was obtained
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|cached| cached.fetched_at)
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh_table().is_some()
    }

    fn fresh_table(&self) -> Option<Arc<RateTable>> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|cached| cached.is_fresh(self.clock.now(), self.ttl))
            .map(|cached| Arc::clone(&cached.table))
    }

    async fn fetch_table(&self) -> (RateTable, RateOrigin) {
        let symbols = Currency::ALL;
        log::debug!("Refreshing rates for {}", Currency::joined_codes(&symbols));

        match self.primary.fetch_rates(&symbols).await {
            Ok(table) => {
                warn_if_incomplete(&table, self.primary.name());
                return (table, RateOrigin::Primary);
            }
            Err(e) => log::warn!("Rate source {} failed: {}", self.primary.name(), e),
        }

        // only the primary's single-rate answer may leave the table partial
        match self.fallback.fetch_rates(&symbols).await {
            Ok(table) if table.is_complete() => return (table, RateOrigin::Fallback),
            Ok(table) => warn_if_incomplete(&table, self.fallback.name()),
            Err(e) => log::warn!("Rate source {} failed: {}", self.fallback.name(), e),
        }

        log::warn!("All rate sources failed, using default rates");
        (RateTable::default_rates(), RateOrigin::Default)
    }
}

fn warn_if_incomplete(table: &RateTable, source: &str) {
    let missing = table.missing();
    if !missing.is_empty() {
        log::warn!(
            "Rate source {} returned no rate for {}",
            source,
            Currency::joined_codes(&missing)
        );
    }
}

fn load_preference(store: &dyn PreferenceStore) -> Currency {
    match store.load(PREFERENCE_KEY) {
        Ok(Some(code)) => Currency::from_code(&code).unwrap_or_else(|| {
            log::warn!("Ignoring unsupported stored currency {:?}", code);
            Currency::default()
        }),
        Ok(None) => Currency::default(),
        Err(e) => {
            log::warn!("Could not read preferred currency: {}", e);
            Currency::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::FxError;
    use crate::preference::MemoryPreferenceStore;
    use crate::sources::StaticRateSource;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn live_table() -> RateTable {
        RateTable::from_entries([
            (Currency::VND, 25_000.0),
            (Currency::USD, 1.0),
            (Currency::EUR, 0.9),
            (Currency::JPY, 150.0),
        ])
        .unwrap()
    }

    fn service(
        primary: StaticRateSource,
        fallback: StaticRateSource,
    ) -> (CurrencyService<StaticRateSource, StaticRateSource>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        let svc = CurrencyService::new(primary, fallback, Box::new(MemoryPreferenceStore::new()))
            .with_clock(Arc::new(clock.clone()));
        (svc, clock)
    }

    #[tokio::test]
    async fn test_primary_table_is_cached() {
        let (svc, _clock) = service(
            StaticRateSource::new(live_table()),
            StaticRateSource::unavailable(),
        );

        let first = svc.get_rates().await;
        let second = svc.get_rates().await;

        assert_eq!(*first, live_table());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(svc.primary.fetch_count(), 1);
        assert_eq!(svc.fallback.fetch_count(), 0);
        assert_eq!(svc.cached_origin(), Some(RateOrigin::Primary));
    }

    #[tokio::test]
    async fn test_fallback_then_default() {
        let (svc, _clock) = service(
            StaticRateSource::unavailable(),
            StaticRateSource::new(live_table()),
        );
        assert_eq!(*svc.get_rates().await, live_table());
        assert_eq!(svc.cached_origin(), Some(RateOrigin::Fallback));

        let (svc, _clock) = service(
            StaticRateSource::unavailable(),
            StaticRateSource::unavailable(),
        );
        assert_eq!(*svc.get_rates().await, RateTable::default_rates());
        assert_eq!(svc.cached_origin(), Some(RateOrigin::Default));
    }

    #[tokio::test]
    async fn test_partial_fallback_table_is_not_cached() {
        let partial = RateTable::from_entries([(Currency::USD, 1.0), (Currency::EUR, 0.9)]).unwrap();
        let (svc, _clock) = service(
            StaticRateSource::unavailable(),
            StaticRateSource::new(partial),
        );

        assert_eq!(*svc.get_rates().await, RateTable::default_rates());
        assert_eq!(svc.cached_origin(), Some(RateOrigin::Default));
        assert_eq!(svc.fallback.fetch_count(), 1);

        let vnd = svc.convert(1.0, Currency::USD, Currency::VND).await.unwrap();
        assert_relative_eq!(vnd, 30_261.5714);
    }

    #[tokio::test]
    async fn test_refresh_after_ttl() {
        let (svc, clock) = service(
            StaticRateSource::new(live_table()),
            StaticRateSource::unavailable(),
        );

        svc.get_rates().await;
        clock.advance(Duration::seconds(3599));
        assert!(svc.is_fresh());
        svc.get_rates().await;
        assert_eq!(svc.primary.fetch_count(), 1);

        clock.advance(Duration::seconds(1));
        assert!(!svc.is_fresh());
        svc.get_rates().await;
        assert_eq!(svc.primary.fetch_count(), 2);
        assert_eq!(svc.cached_at(), Some(clock.now()));
    }

    #[tokio::test]
    async fn test_identity_skips_rates() {
        let (svc, _clock) = service(
            StaticRateSource::new(live_table()),
            StaticRateSource::unavailable(),
        );
        assert_eq!(svc.convert(12.34, Currency::JPY, Currency::JPY).await.unwrap(), 12.34);
        assert_eq!(svc.primary.fetch_count(), 0);
        assert_eq!(svc.cached_origin(), None);
    }

    #[tokio::test]
    async fn test_convert_and_batch() {
        let (svc, _clock) = service(
            StaticRateSource::new(live_table()),
            StaticRateSource::unavailable(),
        );

        let vnd = svc.convert(2.0, Currency::EUR, Currency::VND).await.unwrap();
        assert_relative_eq!(vnd, 55_555.555_555, epsilon = 1e-3);

        let total = svc
            .convert_all(
                &[
                    (10.0, Currency::USD),
                    (9.0, Currency::EUR),
                    (1500.0, Currency::JPY),
                ],
                Currency::USD,
            )
            .await
            .unwrap();
        assert_relative_eq!(total, 30.0, epsilon = 1e-9);
        assert_eq!(svc.primary.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_convert_all_same_currency_skips_rates() {
        let (svc, _clock) = service(
            StaticRateSource::unavailable(),
            StaticRateSource::unavailable(),
        );
        let total = svc
            .convert_all(&[(1.5, Currency::EUR), (2.5, Currency::EUR)], Currency::EUR)
            .await
            .unwrap();
        assert_eq!(total, 4.0);
        assert_eq!(svc.primary.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_table_surfaces_error() {
        let single = RateTable::from_entries([(Currency::USD, 1.0), (Currency::VND, 25_000.0)])
            .unwrap();
        let (svc, _clock) = service(
            StaticRateSource::new(single),
            StaticRateSource::new(live_table()),
        );

        assert!(svc.convert(1.0, Currency::USD, Currency::VND).await.is_ok());
        assert!(matches!(
            svc.convert(1.0, Currency::EUR, Currency::USD).await,
            Err(FxError::IncompleteRateTable {
                currency: Currency::EUR
            })
        ));
        // the partial primary table was installed as is
        assert_eq!(svc.fallback.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_convert_to_preferred() {
        let (svc, _clock) = service(
            StaticRateSource::new(live_table()),
            StaticRateSource::unavailable(),
        );
        assert_eq!(svc.get_preferred_currency(), Currency::VND);
        let vnd = svc.convert_to_preferred(3.0, Currency::USD).await.unwrap();
        assert_relative_eq!(vnd, 75_000.0);

        svc.set_preferred(Currency::JPY);
        let jpy = svc.convert_to_preferred(3.0, Currency::USD).await.unwrap();
        assert_relative_eq!(jpy, 450.0);
    }

    #[test]
    fn test_preference_loading() {
        let stored = MemoryPreferenceStore::with_entry(PREFERENCE_KEY, "eur");
        assert_eq!(load_preference(&stored), Currency::EUR);

        let garbage = MemoryPreferenceStore::with_entry(PREFERENCE_KEY, "XYZ");
        assert_eq!(load_preference(&garbage), Currency::VND);

        assert_eq!(load_preference(&MemoryPreferenceStore::new()), Currency::VND);
    }

    #[test]
    fn test_set_preferred_currency() {
        let (svc, _clock) = service(
            StaticRateSource::unavailable(),
            StaticRateSource::unavailable(),
        );

        assert_eq!(svc.set_preferred_currency("usd").unwrap(), Currency::USD);
        assert_eq!(svc.get_preferred_currency(), Currency::USD);
        assert_eq!(
            svc.preferences.load(PREFERENCE_KEY).unwrap(),
            Some("USD".to_string())
        );

        assert!(matches!(
            svc.set_preferred_currency("XYZ"),
            Err(FxError::InvalidCurrencyCode(_))
        ));
        assert_eq!(svc.get_preferred_currency(), Currency::USD);
        assert_eq!(
            svc.preferences.load(PREFERENCE_KEY).unwrap(),
            Some("USD".to_string())
        );
    }

    #[test]
    fn test_service_formats() {
        let (svc, _clock) = service(
            StaticRateSource::unavailable(),
            StaticRateSource::unavailable(),
        );
        assert_eq!(svc.format_currency(1234.5, Currency::EUR), "€1,234.50");
    }
}
