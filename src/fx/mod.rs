//! Foreign exchange (FX) rates and conversion
//!
//! # Components
//!
//! - **table**: USD-relative rate tables and the hardcoded default rates
//! - **cache**: a table paired with its acquisition time and origin
//! - **service**: the `CurrencyService` that fetches, caches, converts and
//!   tracks the user's preferred currency
//!
//! # Example
//!
//! ```rust
//! use finmate_fx::fx::RateTable;
//! use finmate_fx::Currency;
//!
//! let table = RateTable::default_rates();
//! let vnd = table.convert(100.0, Currency::USD, Currency::VND).unwrap();
//! assert!((vnd - 3_026_157.14).abs() < 0.01);
//! ```

pub mod cache;
pub mod service;
pub mod table;

pub use cache::{CachedRates, DEFAULT_TTL_SECS};
pub use service::{CurrencyService, PREFERENCE_KEY};
pub use table::{RateOrigin, RateTable, DEFAULT_RATES};
