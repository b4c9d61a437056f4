//! Cached rate table with acquisition time

use super::table::{RateOrigin, RateTable};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Default time-to-live of a fetched table
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// A rate table paired with when and where it was obtained
#[derive(Debug, Clone)]
pub struct CachedRates {
    pub table: Arc<RateTable>,
    pub fetched_at: DateTime<Utc>,
    pub origin: RateOrigin,
}

impl CachedRates {
    pub fn new(table: RateTable, fetched_at: DateTime<Utc>, origin: RateOrigin) -> Self {
        Self {
            table: Arc::new(table),
            fetched_at,
            origin,
        }
    }

    /// Fresh while strictly younger than `ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}
