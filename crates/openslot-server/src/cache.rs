//! Response cache with TTL support.
//!
//! An explicit component owning the mapping from request-derived keys to
//! `(response, timestamp)` pairs. It is constructed by the daemon and
//! handed to the request handler; nothing in this crate reaches for
//! global state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use openslot_protocol::Response;
use tracing::{debug, trace};

/// A cached response with its freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached response.
    pub value: Response,
    /// When the entry was last updated (wall clock, for status output).
    pub updated_at: DateTime<Utc>,
    /// When the entry expires (monotonic clock).
    expires_at: Instant,
}

impl CacheEntry {
    /// Creates a new entry with the given TTL.
    pub fn new(value: Response, ttl: Duration) -> Self {
        Self {
            value,
            updated_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Returns true if the entry has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Returns the time until expiration.
    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Builds a cache key from a prefix and sorted parameters.
///
/// Format: `prefix|k=v|k=v`, parameters sorted by name so logically equal
/// requests share a key regardless of field order.
pub fn cache_key(prefix: &str, params: &[(&str, String)]) -> String {
    let mut params: Vec<_> = params.iter().collect();
    params.sort_by_key(|(name, _)| *name);

    let mut key = String::from(prefix);
    for (name, value) in params {
        key.push('|');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

/// TTL cache mapping request keys to responses.
#[derive(Debug)]
pub struct ResponseCache {
    default_ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl ResponseCache {
    /// Creates a cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: HashMap::new(),
        }
    }

    /// Returns the default TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Gets an entry by key, only if not expired.
    pub fn get_valid(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    /// Inserts or replaces an entry with the default TTL.
    pub fn insert(&mut self, key: impl Into<String>, value: Response) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Inserts or replaces an entry with a custom TTL.
    pub fn insert_with_ttl(&mut self, key: impl Into<String>, value: Response, ttl: Duration) {
        let key = key.into();
        debug!(key = %key, ttl_secs = ttl.as_secs(), "caching response");
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        debug!(count = count, "cleared response cache");
    }

    /// Removes all expired entries, returning how many were evicted.
    pub fn evict_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep {
                trace!(key = %key, "evicting expired cache entry");
            }
            keep
        });
        before - self.entries.len()
    }

    /// Returns the number of entries (including expired, pre-eviction).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the time until the next entry expires.
    pub fn next_expiry(&self) -> Option<Duration> {
        self.entries
            .values()
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.time_until_expiry())
            .min()
    }
}
