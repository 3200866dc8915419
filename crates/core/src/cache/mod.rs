//! In-memory response cache shared by every lookup the API client makes.
//!
//! Entries live for a fixed TTL and are evicted lazily: a read that finds a stale entry
//! removes it and reports a miss. There is no size bound.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    stored_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ResponseCache<V = serde_json::Value> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn set(&self, key: impl Into<String>, data: V) {
        let entry = CacheEntry {
            data,
            stored_at: self.clock.now(),
        };
        self.entries().insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries();
        let entry = entries.get(key)?;

        if now - entry.stored_at > self.ttl {
            entries.remove(key);
            tracing::debug!(cache_key = %key, "cache entry expired");
            return None;
        }

        Some(entry.data.clone())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Never held across an await.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn cache_at_fixed_time() -> (Arc<ManualClock>, ResponseCache) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
        ));
        let cache = ResponseCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn get_returns_value_right_after_set() {
        let (_clock, cache) = cache_at_fixed_time();
        cache.set("plan-id-FY25NAC535", json!({"found": true}));

        assert_eq!(cache.get("plan-id-FY25NAC535"), Some(json!({"found": true})));
        assert!(cache.has("plan-id-FY25NAC535"));
        assert!(!cache.has("plan-id-other"));
    }

    #[test]
    fn entry_is_visible_up_to_and_including_ttl() {
        let (clock, cache) = cache_at_fixed_time();
        cache.set("k", json!(1));

        clock.advance(Duration::seconds(DEFAULT_TTL_SECS));
        assert_eq!(cache.get("k"), Some(json!(1)));
    }

    #[test]
    fn expired_entry_is_absent_and_evicted() {
        let (clock, cache) = cache_at_fixed_time();
        cache.set("k", json!(1));
        assert_eq!(cache.len(), 1);

        clock.advance(Duration::seconds(DEFAULT_TTL_SECS + 1));
        assert_eq!(cache.get("k"), None);
        assert!(!cache.has("k"));
        assert!(cache.is_empty());
    }

    #[test]
    fn set_refreshes_timestamp() {
        let (clock, cache) = cache_at_fixed_time();
        cache.set("k", json!("old"));
        clock.advance(Duration::minutes(4));
        cache.set("k", json!("new"));
        clock.advance(Duration::minutes(4));

        assert_eq!(cache.get("k"), Some(json!("new")));
    }

    #[test]
    fn clear_removes_everything() {
        let (_clock, cache) = cache_at_fixed_time();
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
