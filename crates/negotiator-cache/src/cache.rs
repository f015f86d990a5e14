use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: SystemTime) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> SystemTime {
        (**self).now()
    }
}

/// A stored session value with its creation instant.
///
/// Entries are immutable once stored; a new `put` replaces the whole entry.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub session_key: String,
    pub value: Arc<T>,
    pub created_at: SystemTime,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(session_key: impl Into<String>, value: T, created_at: SystemTime, ttl: Duration) -> Self {
        Self {
            session_key: session_key.into(),
            value: Arc::new(value),
            created_at,
            ttl,
        }
    }

    /// Time since creation. A clock that moved backwards reads as zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.created_at).unwrap_or(Duration::ZERO)
    }

    /// Live while `age < ttl`.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.age(now) >= self.ttl
    }

    pub fn remaining(&self, now: SystemTime) -> Duration {
        self.ttl.saturating_sub(self.age(now))
    }
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            session_key: self.session_key.clone(),
            value: Arc::clone(&self.value),
            created_at: self.created_at,
            ttl: self.ttl,
        }
    }
}

impl<T> Deref for CacheEntry<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because their TTL had elapsed
    pub expirations: u64,
    /// Puts that overwrote a live entry for the same key
    pub replacements: u64,
    pub puts: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Session-scoped store with a fixed time-to-live.
///
/// A `get` either returns the complete value most recently stored under the
/// key or nothing. Expired entries are never returned.
pub trait SessionStore<V>: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry and restarting its TTL.
    fn put(&self, key: &str, value: V) -> CacheEntry<V>;

    /// Live entry for `key`. An expired entry observed here is removed.
    fn get(&self, key: &str) -> Option<CacheEntry<V>>;

    /// Time left before the entry for `key` expires.
    fn remaining(&self, key: &str) -> Option<Duration> {
        self.get(key).map(|entry| entry.remaining(self.now()))
    }

    fn remove(&self, key: &str) -> bool;

    /// Drop every expired entry and report how many went.
    fn purge_expired(&self) -> usize;

    /// Number of stored entries, expired ones not yet observed included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> CacheStats;

    fn ttl(&self) -> Duration;

    fn now(&self) -> SystemTime;
}
