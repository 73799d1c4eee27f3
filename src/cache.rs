//! Bounded-lifetime response cache shared by the retrieval and
//! classification layers.
//!
//! Both providers are slow and billed per call, and an interactive session
//! tends to re-request the same company/window/query tuple, so results are
//! held for a fixed time window (one hour by default). The cache is an
//! explicit value injected into its consumers rather than a hidden layer, so
//! tests can substitute a zero-TTL instance and assert provider call counts.
//!
//! Concurrent misses for the same key may each perform the underlying call;
//! whichever insert lands last wins. That is sound here because every cached
//! value is a pure function of its key.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// How long news results and classifications stay valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// A thread-safe map with per-entry expiry (clone-on-read).
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a live entry. Expired entries report as absent and are
    /// overwritten by the next insert.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any previous entry for the key
    /// (last writer wins).
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key, CacheEntry::new(value, self.ttl));
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.read().unwrap().len())
            .finish()
    }
}
