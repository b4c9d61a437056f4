//! # finmate-fx
//!
//! Currency conversion for the FinMate expense tracker.
//!
//! Exchange rates are fetched from the tracker's backend, with a public
//! exchange-rate service as fallback and a hardcoded table as last resort,
//! then cached for an hour. Amounts convert between VND, USD, EUR and JPY
//! through USD, and are formatted for display per currency convention. The
//! user's preferred display currency is persisted between sessions.
//!
//! ## Example
//!
//! ```rust,no_run
//! use finmate_fx::prelude::*;
//!
//! # async fn run() -> finmate_fx::Result<()> {
//! let service = FxConfig::load(None)?.build_service()?;
//!
//! let preferred = service.get_preferred_currency();
//! let amount = service.convert(250_000.0, Currency::VND, preferred).await;
//! println!("{}", format_conversion(&amount, preferred));
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod fx;
pub mod preference;
pub mod sources;

pub use currency::Currency;
pub use error::{FxError, Result};
pub use format::{format_conversion, format_currency};

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::config::{FxConfig, HttpCurrencyService};
    pub use crate::currency::Currency;
    pub use crate::error::{FxError, Result};
    pub use crate::format::{format_conversion, format_currency, CONVERSION_UNAVAILABLE};
    pub use crate::fx::{CurrencyService, RateOrigin, RateTable};
    pub use crate::preference::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
    pub use crate::sources::{ExchangeRateHostSource, ProxyRateSource, RateSource, StaticRateSource};
}
