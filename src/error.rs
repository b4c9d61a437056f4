//! Error types for finmate-fx

use crate::currency::Currency;
use thiserror::Error;

/// Main error type for currency operations
#[derive(Error, Debug)]
pub enum FxError {
    /// A single rate source could not produce a usable table.
    /// The service recovers from this locally and never returns it from `get_rates`.
    #[error("Rate fetch failed: {0}")]
    RateFetch(String),

    #[error("Rate table has no entry for {currency}")]
    IncompleteRateTable { currency: Currency },

    #[error("Invalid rate for {currency}: {rate}")]
    InvalidRate { currency: Currency, rate: f64 },

    #[error("Unsupported currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Preference store unavailable: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for finmate-fx operations
pub type Result<T> = std::result::Result<T, FxError>;
