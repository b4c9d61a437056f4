//! USD-relative rate tables

use crate::currency::Currency;
use crate::error::{FxError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Degraded-mode rates used when every source is unreachable
///
/// Approximate units per USD, like every other table.
pub const DEFAULT_RATES: [(Currency, f64); 4] = [
    (Currency::VND, 30261.5714),
    (Currency::USD, 1.0),
    (Currency::EUR, 1.0),
    (Currency::JPY, 175.907461),
];

/// Where the table currently held by the cache came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Primary,
    Fallback,
    Default,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateOrigin::Primary => "primary",
            RateOrigin::Fallback => "fallback",
            RateOrigin::Default => "default",
        };
        write!(f, "{}", label)
    }
}

/// Units of each currency per 1 USD
///
/// Built once and never mutated afterwards; a refresh replaces the whole table.
/// A table may lack entries when a source only reported a single pair, in
/// which case lookups for the missing currencies fail.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateTable {
    rates: BTreeMap<Currency, f64>,
}

impl RateTable {
    /// Build a table, rejecting non-positive or non-finite rates
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Currency, f64)>,
    {
        let mut rates = BTreeMap::new();
        for (currency, rate) in entries {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(FxError::InvalidRate { currency, rate });
            }
            rates.insert(currency, rate);
        }
        Ok(Self { rates })
    }

    /// The hardcoded fallback table
    pub fn default_rates() -> Self {
        Self {
            rates: DEFAULT_RATES.iter().copied().collect(),
        }
    }

    /// Rate for a currency, if the table has one
    pub fn get(&self, currency: Currency) -> Option<f64> {
        self.rates.get(&currency).copied()
    }

    /// Rate for a currency, failing when the table lacks it
    pub fn rate(&self, currency: Currency) -> Result<f64> {
        self.get(currency)
            .ok_or(FxError::IncompleteRateTable { currency })
    }

    /// Supported currencies with no entry
    pub fn missing(&self) -> Vec<Currency> {
        Currency::ALL
            .iter()
            .copied()
            .filter(|c| !self.rates.contains_key(c))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.rates.iter().map(|(c, r)| (*c, *r))
    }

    /// Convert through USD: `from -> USD -> to`
    ///
    /// Direct cross rates are never used, only the USD-relative entries.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<f64> {
        if from == to {
            return Ok(amount);
        }

        let amount_in_base = if from == Currency::BASE {
            amount
        } else {
            amount / self.rate(from)?
        };

        if to == Currency::BASE {
            Ok(amount_in_base)
        } else {
            Ok(amount_in_base * self.rate(to)?)
        }
    }
}
