//! In-memory cache for GET responses
//!
//! Entries expire lazily: a stale entry is reported as a miss and replaced by
//! the next store, never actively purged. There is no size bound, so memory
//! grows with the number of distinct (endpoint, params) pairs fetched.

pub mod key;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

pub use key::cache_key;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

/// TTL cache keyed by [`cache_key`].
///
/// The map sits behind a mutex so concurrent requests on one client see a
/// consistent view; a poisoned lock degrades to cache misses.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached payload if present and younger than the TTL.
    pub fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Option<Value> {
        let key = cache_key(endpoint, params);
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(&key)?;

        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Store (or overwrite) the payload for a request.
    pub fn put(&self, endpoint: &str, params: &[(&str, &str)], payload: Value) {
        let key = cache_key(endpoint, params);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                CacheEntry {
                    payload,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
