//! Keyed query cache backing the data-sync bindings. Entries become stale by
//! age (polling bindings) or by explicit invalidation (mutation bindings);
//! invalidation removes the entry outright so the next read must re-fetch.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::Mutex,
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    /// None means entries never age out; only invalidation evicts them.
    ttl: Option<Duration>,
}

impl<K: Eq + Hash + Clone, V: Clone> QueryCache<K, V> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn read_through<E>(
        &self,
        key: K,
        fetch: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        self.read_through_at(key, Instant::now(), fetch)
    }

    fn read_through_at<E>(
        &self,
        key: K,
        now: Instant,
        fetch: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(fresh) = self.fresh_value(&key, now) {
            return Ok(fresh);
        }

        let value = fetch()?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                Entry {
                    value: value.clone(),
                    fetched_at: now,
                },
            );
        }

        Ok(value)
    }

    /// Cached value regardless of freshness; never fetches.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).map(|entry| entry.value.clone()))
    }

    pub fn invalidate(&self, key: &K) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn fresh_value(&self, key: &K, now: Instant) -> Option<V> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;

        match self.ttl {
            Some(ttl) if now.duration_since(entry.fetched_at) >= ttl => None,
            _ => Some(entry.value.clone()),
        }
    }
}
