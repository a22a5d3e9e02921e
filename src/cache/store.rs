//! In-memory response cache with per-entry expiry
//!
//! Provides a `ResponseCache` that memoizes parsed API responses as JSON
//! values. Entries expire lazily: an expired entry is removed by the read that
//! discovers it and reported as a miss. Nothing is swept in the background
//! and nothing is ever served stale.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::keys::{CacheKey, Resource};

/// A stored response
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached payload
    value: Value,
    /// When the entry stops being served
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Key/value store with TTL expiry and prefix invalidation
///
/// Cloning is cheap and every clone shares the same store, so one cache can
/// be handed to several API clients. Each operation holds the internal lock
/// only for its own duration.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Creates an empty cache driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty cache driven by a custom clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(clock),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Every critical section leaves the map consistent, so poison is ignored.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the stored JSON for `key` if present and not yet expired
    ///
    /// An entry whose expiry is at or before the current time is removed and
    /// reported as absent.
    pub fn get_json(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries();

        let Some(entry) = entries.get(key) else {
            debug!(key, "cache miss");
            return None;
        };
        if entry.is_fresh(now) {
            debug!(key, "cache hit");
            return Some(entry.value.clone());
        }

        entries.remove(key);
        debug!(key, "cache entry expired");
        None
    }

    /// Returns the value stored under `key`, decoded as `T`
    ///
    /// A stored value of a different shape counts as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_json(key)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key, error = %e, "cached value has unexpected shape");
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl`, replacing any existing entry
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "value not cacheable");
                return;
            }
        };

        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        debug!(key, ttl_ms, "cache set");
        self.entries()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Removes every entry whose key starts with `prefix`, or all entries
    /// when `prefix` is `None`
    pub fn clear(&self, prefix: Option<&str>) {
        let mut entries = self.entries();
        match prefix {
            Some(prefix) => {
                let before = entries.len();
                entries.retain(|key, _| !key.starts_with(prefix));
                debug!(prefix, removed = before - entries.len(), "cache cleared");
            }
            None => {
                debug!(removed = entries.len(), "cache cleared");
                entries.clear();
            }
        }
    }

    /// Typed form of [`ResponseCache::get`]
    pub fn get_cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.get(&key.to_string())
    }

    /// Typed form of [`ResponseCache::set`]
    pub fn set_cached<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        self.set(&key.to_string(), value, ttl);
    }

    /// Drops every cached variant of `resource`
    pub fn invalidate(&self, resource: Resource) {
        self.clear(Some(resource.as_str()));
    }

    /// Whether an entry is stored under `key`, fresh or not
    pub fn contains_entry(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
