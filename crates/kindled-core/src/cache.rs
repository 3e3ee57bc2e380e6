//! TTL'd cache of computed streak results.
//!
//! Entries are stored serialized through a [`CacheBackend`], so the
//! backing store is swappable (the default keeps everything in memory).
//! Expiry is evaluated lazily on read; there are no background timers.
//! A failing or corrupt backend is never an error: reads degrade to a
//! miss and the engine recomputes from the session store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CacheError;
use crate::streak::{StreakHistory, StreakRecord};

/// Default entry lifetime: 5 minutes.
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Storage abstraction for serialized cache entries.
pub trait CacheBackend: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn store(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Default in-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// A cached value with its expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Per-user streak records plus one global history entry.
pub struct StreakCache {
    backend: Box<dyn CacheBackend>,
    ttl: Duration,
}

impl StreakCache {
    /// In-memory cache with the default 5-minute TTL.
    pub fn new() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    pub fn with_backend(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            backend,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    pub fn with_ttl_secs(mut self, secs: i64) -> Self {
        self.ttl = Duration::seconds(secs);
        self
    }

    /// Cached record for a user, honoring TTL. Expired entries are
    /// dropped on the way out.
    pub fn record(&self, user_id: &str, now: DateTime<Utc>) -> Option<StreakRecord> {
        self.read_entry(&record_key(user_id), now, true)
    }

    /// Cached record ignoring expiry. Serves the fallback path when the
    /// session store is unavailable: stale data beats no data.
    pub fn stale_record(&self, user_id: &str) -> Option<StreakRecord> {
        self.read_entry(&record_key(user_id), Utc::now(), false)
    }

    /// Replace a user's record with a fresh expiry.
    pub fn put_record(&self, user_id: &str, record: &StreakRecord, now: DateTime<Utc>) {
        self.write_entry(&record_key(user_id), record, now);
    }

    /// Drop a user's record outright.
    pub fn invalidate(&self, user_id: &str) {
        if let Err(e) = self.backend.remove(&record_key(user_id)) {
            warn!(user_id, error = %e, "cache invalidate failed");
        }
    }

    /// The global history entry, honoring TTL.
    pub fn history(&self, now: DateTime<Utc>) -> Option<StreakHistory> {
        self.read_entry(HISTORY_KEY, now, true)
    }

    /// Replace the global history entry.
    pub fn put_history(&self, history: &StreakHistory, now: DateTime<Utc>) {
        self.write_entry(HISTORY_KEY, history, now);
    }

    fn read_entry<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        respect_ttl: bool,
    ) -> Option<T> {
        let raw = match self.backend.load(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "corrupt cache entry, treating as miss");
                let _ = self.backend.remove(key);
                return None;
            }
        };

        if respect_ttl && entry.is_expired(now) {
            let _ = self.backend.remove(key);
            return None;
        }
        Some(entry.value)
    }

    fn write_entry<T: Serialize>(&self, key: &str, value: &T, now: DateTime<Utc>) {
        let entry = CacheEntry {
            value,
            expires_at: now + self.ttl,
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = self.backend.store(key, &json) {
                    warn!(key, error = %e, "cache write failed");
                }
            }
            Err(e) => warn!(key, error = %e, "cache encode failed"),
        }
    }
}

impl Default for StreakCache {
    fn default() -> Self {
        Self::new()
    }
}

const HISTORY_KEY: &str = "history";

fn record_key(user_id: &str) -> String {
    format!("streak:{user_id}")
}
