//! Service configuration
//!
//! Read from TOML. Every field has a default, so an empty file (or no file)
//! gives a working setup pointed at a backend on `localhost:8080`.
//!
//! ```toml
//! primary_url = "http://localhost:8080/api/exchange-rate"
//! fallback_url = "https://api.exchangerate.host/latest"
//! request_timeout_secs = 5
//! cache_ttl_secs = 3600
//! preference_path = "/home/me/.finmate/preferences.json"
//! ```

use crate::error::{FxError, Result};
use crate::fx::{CurrencyService, DEFAULT_TTL_SECS};
use crate::preference::JsonFilePreferenceStore;
use crate::sources::exchangerate_host::EXCHANGERATE_HOST_URL;
use crate::sources::proxy::DEFAULT_PROXY_URL;
use crate::sources::{ExchangeRateHostSource, ProxyRateSource, DEFAULT_REQUEST_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service wired to the real HTTP sources and a preference file
pub type HttpCurrencyService = CurrencyService<ProxyRateSource, ExchangeRateHostSource>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxConfig {
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
    #[serde(default = "default_preference_path")]
    pub preference_path: PathBuf,
}

fn default_primary_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

fn default_fallback_url() -> String {
    EXCHANGERATE_HOST_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_cache_ttl_secs() -> i64 {
    DEFAULT_TTL_SECS
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".finmate")
}

fn default_preference_path() -> PathBuf {
    app_dir().join("preferences.json")
}

/// `~/.finmate/config.toml`
pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            preference_path: default_preference_path(),
        }
    }
}

impl FxConfig {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(FxError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.cache_ttl_secs <= 0 {
            return Err(FxError::Config("cache_ttl_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs)
    }

    /// Build a service using the configured sources and preference file
    pub fn build_service(&self) -> Result<HttpCurrencyService> {
        let primary = ProxyRateSource::with_timeout(&self.primary_url, self.request_timeout())?;
        let fallback = ExchangeRateHostSource::with_url(&self.fallback_url, self.request_timeout())?;
        let preferences = JsonFilePreferenceStore::new(&self.preference_path);
        Ok(CurrencyService::new(primary, fallback, Box::new(preferences)).with_ttl(self.cache_ttl()))
    }
}
