//! Wallet balances with a persistent, time-boxed cache.
//!
//! Balance lookups are best effort. A failed fetch never surfaces as an
//! error: the last known value (or `0.0`) is returned and a warning logged.

use crate::cache::{CacheEntry, TtlCache};
use crate::error::Result;
use crate::slot::{BALANCES_KEY, LocalSlot};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Something that can report the USD balance of an address.
pub trait BalanceSource {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Fetch the current balance of `address`.
    ///
    /// # Errors
    ///
    /// Any failure; callers treat it as "balance unavailable".
    fn fetch(&self, address: &str) -> anyhow::Result<f64>;
}

/// Source used when no balance service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredSource;

impl BalanceSource for UnconfiguredSource {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn fetch(&self, _address: &str) -> anyhow::Result<f64> {
        anyhow::bail!("no balance service configured")
    }
}

/// Cached balances persisted in the slot.
#[derive(Debug)]
pub struct BalanceBook<'a> {
    slot: &'a LocalSlot,
    cache: TtlCache<f64>,
}

impl<'a> BalanceBook<'a> {
    /// Load cached balances from the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub fn load(slot: &'a LocalSlot, ttl: Duration) -> Result<Self> {
        let entries: BTreeMap<String, CacheEntry<f64>> = slot.get(BALANCES_KEY, BTreeMap::new())?;
        Ok(Self {
            slot,
            cache: TtlCache::from_entries(ttl, entries),
        })
    }

    /// Balance of `address`: cached when fresh, fetched otherwise.
    ///
    /// A failed fetch falls back to the stale cached value, or `0.0`.
    pub fn balance_of(
        &mut self,
        source: &dyn BalanceSource,
        address: &str,
        now: DateTime<Utc>,
    ) -> f64 {
        if let Some(value) = self.cache.get_fresh(address, now) {
            debug!(address, value, "Balance served from cache");
            return *value;
        }
        match source.fetch(address) {
            Ok(value) => {
                self.cache.insert(address, value, now);
                value
            }
            Err(err) => {
                let fallback = self.cache.get(address).map_or(0.0, |entry| entry.value);
                warn!(
                    address,
                    source = source.name(),
                    error = %err,
                    fallback,
                    "Balance fetch failed"
                );
                fallback
            }
        }
    }

    /// Record a balance obtained elsewhere.
    pub fn record(&mut self, address: &str, value: f64, now: DateTime<Utc>) {
        self.cache.insert(address, value, now);
    }

    /// Forget the cached balance of `address`.
    pub fn forget(&mut self, address: &str) -> bool {
        self.cache.remove(address).is_some()
    }

    #[must_use]
    pub const fn cache(&self) -> &TtlCache<f64> {
        &self.cache
    }

    /// Write the cache back to the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    pub fn save(&self) -> Result<()> {
        self.slot.set(BALANCES_KEY, self.cache.entries())
    }
}
