/// Key-value cache with per-entry TTL.
///
/// Used exclusively by `client::UsgsClient` to hold upstream query results
/// keyed by operation and site number. The contract is purely
/// get/set/delete with TTL semantics: an entry whose expiry instant has
/// been reached is treated as absent, never as stale-but-usable.
///
/// # Clock injection
/// `get_at`/`set_at` accept a `now: DateTime<Utc>` parameter rather than
/// calling `Utc::now()` internally, so expiry boundaries are deterministic
/// in tests. `get`/`set` are thin wrappers over the real clock.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// In-memory TTL cache. Not shared across threads; each request-scoped
/// operation reads and writes it within one logical operation per key.
#[derive(Debug, Default)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> CacheStore<V> {
    pub fn new() -> CacheStore<V> {
        CacheStore {
            entries: HashMap::new(),
        }
    }

    /// Returns the cached value for `key`, or `None` if never set or
    /// expired relative to the real clock.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Returns the cached value for `key` as of `now`.
    ///
    /// Expiry is inclusive: an entry is absent at exactly its expiry
    /// instant (`now >= expires_at`).
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        self.entries.get(key).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Stores `value` under `key` for `ttl_secs` seconds from the real
    /// clock. Overwrites silently; no versioning.
    pub fn set(&mut self, key: &str, value: V, ttl_secs: i64) {
        self.set_at(key, value, ttl_secs, Utc::now());
    }

    /// Stores `value` under `key`, expiring `ttl_secs` seconds after `now`.
    pub fn set_at(&mut self, key: &str, value: V, ttl_secs: i64, now: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + Duration::seconds(ttl_secs),
            },
        );
    }

    /// Removes `key` outright. Used for forced invalidation, e.g. clearing
    /// a poisoned entry after malformed upstream data. Returns whether an
    /// entry (expired or not) was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of stored entries, including ones already past expiry that
    /// have not been overwritten or deleted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// A fixed "now" used across all tests: 2024-05-01 13:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    #[test]
    fn test_get_returns_value_before_expiry() {
        let mut cache = CacheStore::new();
        let now = fixed_now();
        cache.set_at("validation:05568500", "cached".to_string(), 900, now);

        let just_before = now + Duration::seconds(899);
        assert_eq!(
            cache.get_at("validation:05568500", just_before),
            Some("cached".to_string()),
            "entry should survive until the expiry instant"
        );
    }

    #[test]
    fn test_entry_absent_at_exactly_the_expiry_instant() {
        let mut cache = CacheStore::new();
        let now = fixed_now();
        cache.set_at("current:05568500", 42, 900, now);

        let at_expiry = now + Duration::seconds(900);
        assert_eq!(
            cache.get_at("current:05568500", at_expiry),
            None,
            "expiry boundary is exclusive — now == expires_at means absent"
        );
    }

    #[test]
    fn test_never_set_key_is_absent() {
        let cache: CacheStore<String> = CacheStore::new();
        assert_eq!(cache.get_at("validation:00000000", fixed_now()), None);
    }

    #[test]
    fn test_set_overwrites_silently() {
        let mut cache = CacheStore::new();
        let now = fixed_now();
        cache.set_at("k", "first".to_string(), 60, now);
        cache.set_at("k", "second".to_string(), 60, now);
        assert_eq!(cache.get_at("k", now), Some("second".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let mut cache = CacheStore::new();
        let now = fixed_now();
        cache.set_at("k", 1, 60, now);
        // 30 seconds later the entry is rewritten with a fresh 60s TTL.
        let later = now + Duration::seconds(30);
        cache.set_at("k", 2, 60, later);
        // 45 seconds after the rewrite the original TTL would have lapsed.
        let check = later + Duration::seconds(45);
        assert_eq!(cache.get_at("k", check), Some(2));
    }

    #[test]
    fn test_delete_removes_entry() {
        let mut cache = CacheStore::new();
        let now = fixed_now();
        cache.set_at("k", 1, 60, now);
        assert!(cache.delete("k"));
        assert_eq!(cache.get_at("k", now), None);
        assert!(!cache.delete("k"), "second delete finds nothing");
    }

    #[test]
    fn test_expired_entry_not_resurrected_by_get() {
        let mut cache = CacheStore::new();
        let now = fixed_now();
        cache.set_at("k", 1, 10, now);
        let past_expiry = now + Duration::seconds(11);
        assert_eq!(cache.get_at("k", past_expiry), None);
        // A later read at an earlier logical time is still served; the
        // store keeps the entry until overwritten or deleted.
        assert_eq!(cache.get_at("k", now), Some(1));
    }
}
