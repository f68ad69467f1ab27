//! Short-lived cache of recently fetched lists.
//!
//! Lets a screen that is re-mounted shortly after a fetch render from
//! memory instead of going back to the backend. Entries expire after a
//! fixed validity window and are evicted lazily on read.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Validity window of a recently fetched feed.
pub const RECENT_FEED_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Thread-safe TTL map.
pub struct RecentCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> RecentCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Cache with the standard [`RECENT_FEED_TTL`] window.
    pub fn new() -> Self {
        Self::with_ttl(RECENT_FEED_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Remove every entry for which `predicate` holds.
    pub fn invalidate_where(&self, mut predicate: impl FnMut(&K, &V) -> bool) {
        self.lock().retain(|k, entry| !predicate(k, &entry.value));
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including not-yet-evicted stale ones.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // ---- private helpers ----

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.stored_at) > self.ttl,
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    fn insert_at(&self, key: K, value: V, now: Instant) {
        self.lock().insert(
            key,
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: Eq + Hash, V: Clone> Default for RecentCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
