use crate::cache::{CacheEntry, CacheStats, Clock, SessionStore, SystemClock};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Concurrent in-memory session store with lazy TTL eviction.
///
/// Readers and writers on different keys never block each other. Each key
/// holds one immutable [`CacheEntry`]; a `put` swaps the whole entry, so a
/// reader sees either the old value or the new one, never a mix.
pub struct InMemorySessionCache<V, C = SystemClock> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: C,
    stats: Arc<Mutex<CacheStats>>,
}

impl<V> InMemorySessionCache<V, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V, C: Clock> InMemorySessionCache<V, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            clock,
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Remove `observed` only if it is still the entry stored under its key.
    /// A concurrent put of a fresh value must survive the eviction.
    fn evict_if_current(&self, observed: &CacheEntry<V>) -> bool {
        let removed = self
            .entries
            .remove_if(&observed.session_key, |_, current| {
                Arc::ptr_eq(&current.value, &observed.value)
            })
            .is_some();
        if removed {
            self.stats.lock().expirations += 1;
            debug!(session_key = %observed.session_key, "Evicted expired session entry");
        }
        removed
    }
}

impl<V, C> SessionStore<V> for InMemorySessionCache<V, C>
where
    V: Send + Sync,
    C: Clock,
{
    fn put(&self, key: &str, value: V) -> CacheEntry<V> {
        let now = self.clock.now();
        let entry = CacheEntry::new(key, value, now, self.ttl);
        let previous = self.entries.insert(key.to_string(), entry.clone());

        let mut stats = self.stats.lock();
        stats.puts += 1;
        if let Some(previous) = previous {
            if previous.is_expired(now) {
                stats.expirations += 1;
            } else {
                stats.replacements += 1;
            }
        }
        debug!(session_key = %key, ttl_secs = self.ttl.as_secs(), "Stored session entry");
        entry
    }

    fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        // Clone out of the shard guard before any removal touches the same shard
        let observed = self.entries.get(key).map(|entry| entry.value().clone());

        match observed {
            Some(entry) if !entry.is_expired(self.clock.now()) => {
                self.stats.lock().hits += 1;
                Some(entry)
            }
            Some(expired) => {
                self.evict_if_current(&expired);
                self.stats.lock().misses += 1;
                None
            }
            None => {
                self.stats.lock().misses += 1;
                None
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            self.stats.lock().expirations += purged as u64;
            debug!(purged, "Purged expired session entries");
        }
        purged
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.entries = self.entries.len();
        stats
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn now(&self) -> SystemTime {
        self.clock.now()
    }
}
