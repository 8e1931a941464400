//! Time-boxed cache for values fetched from outside services.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cached value and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// True while `now` is less than `ttl` past the fetch time.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// Keyed cache whose entries go stale after a fixed TTL.
///
/// Stale entries are kept: callers may still fall back to them when a
/// refetch fails.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: BTreeMap<String, CacheEntry<V>>,
}

impl<V> TtlCache<V> {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn from_entries(ttl: Duration, entries: BTreeMap<String, CacheEntry<V>>) -> Self {
        Self { ttl, entries }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The value for `key` if it is still fresh at `now`.
    #[must_use]
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| &entry.value)
    }

    /// The entry for `key`, fresh or stale.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                fetched_at: now,
            },
        );
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<String, CacheEntry<V>> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_go_stale_after_ttl() {
        let now = Utc::now();
        let mut cache = TtlCache::new(Duration::seconds(60));
        cache.insert("0xabc", 12.5_f64, now);

        assert_eq!(cache.get_fresh("0xabc", now + Duration::seconds(59)), Some(&12.5));
        assert_eq!(cache.get_fresh("0xabc", now + Duration::seconds(60)), None);
        assert_eq!(cache.get("0xabc").map(|e| e.value), Some(12.5));
    }

    #[test]
    fn insert_refreshes_timestamp() {
        let start = Utc::now();
        let mut cache = TtlCache::new(Duration::seconds(10));
        cache.insert("k", 1_u32, start);
        let later = start + Duration::seconds(30);
        assert!(cache.get_fresh("k", later).is_none());
        cache.insert("k", 2_u32, later);
        assert_eq!(cache.get_fresh("k", later), Some(&2));
        assert_eq!(cache.len(), 1);
    }
}
