//! Supported currencies

use crate::error::{FxError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies the tracker can display and convert between (ISO 4217 codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Vietnamese Dong
    VND,
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// Japanese Yen
    JPY,
}

impl Currency {
    /// Every supported currency, in the order rate sources are queried
    pub const ALL: [Currency; 4] = [Currency::VND, Currency::USD, Currency::EUR, Currency::JPY];

    /// Pivot currency for all conversions
    pub const BASE: Currency = Currency::USD;

    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::VND => "VND",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::JPY => "JPY",
        }
    }

    /// Get currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "₫",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::JPY => "¥",
        }
    }

    /// Digits shown after the decimal point
    pub fn display_decimals(&self) -> usize {
        match self {
            Currency::VND | Currency::JPY => 0,
            Currency::USD | Currency::EUR => 2,
        }
    }

    /// Parse from ISO code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "VND" => Some(Currency::VND),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }

    /// Comma-joined codes, as rate sources expect them in query strings
    pub fn joined_codes(currencies: &[Currency]) -> String {
        currencies
            .iter()
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::VND
    }
}

impl FromStr for Currency {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        Currency::from_code(s).ok_or_else(|| FxError::InvalidCurrencyCode(s.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert_eq!(Currency::VND.code(), "VND");
        assert_eq!(Currency::USD.code(), "USD");
        assert_eq!(Currency::EUR.to_string(), "EUR");
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(Currency::VND.symbol(), "₫");
        assert_eq!(Currency::USD.symbol(), "$");
        assert_eq!(Currency::EUR.symbol(), "€");
        assert_eq!(Currency::JPY.symbol(), "¥");
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Currency::from_code("jpy"), Some(Currency::JPY));
        assert_eq!(Currency::from_code(" usd "), Some(Currency::USD));
        assert_eq!(Currency::from_code("GBP"), None);
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(FxError::InvalidCurrencyCode(code)) if code == "XYZ"
        ));
    }

    #[test]
    fn test_default_is_vnd() {
        assert_eq!(Currency::default(), Currency::VND);
    }

    #[test]
    fn test_joined_codes() {
        assert_eq!(Currency::joined_codes(&Currency::ALL), "VND,USD,EUR,JPY");
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&Currency::EUR).unwrap();
        assert_eq!(json, "\"EUR\"");
        let parsed: Currency = serde_json::from_str("\"VND\"").unwrap();
        assert_eq!(parsed, Currency::VND);
    }
}
