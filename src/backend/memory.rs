//! `local-memory` adapter (in-process).
//!
//! Entries live in a bounded [`moka::sync::Cache`]; each entry carries its own
//! TTL, applied through a [`moka::Expiry`] policy so a later `set` replaces both
//! value and expiration.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::sync::Cache;
use serde_json::Value;

use super::error::BackendResult;
use super::types::{BackendStats, effective_ttl};
use super::CacheBackend;
use crate::constants::DEFAULT_LOCAL_CAPACITY;

#[derive(Debug, Clone)]
struct StoredValue {
    value: Value,
    ttl: Option<Duration>,
}

struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        stored: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        stored.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        stored: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        stored.ttl
    }
}

/// Bounded in-memory store with per-entry TTL and LRU-style eviction.
pub struct MemoryBackend {
    name: String,
    capacity: u64,
    entries: Cache<String, StoredValue>,
}

impl MemoryBackend {
    /// Creates a backend with [`DEFAULT_LOCAL_CAPACITY`].
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_LOCAL_CAPACITY)
    }

    /// Creates a backend holding at most `capacity` entries.
    pub fn with_capacity(name: impl Into<String>, capacity: u64) -> Self {
        Self {
            name: name.into(),
            capacity,
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the number of live entries (runs pending maintenance first).
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Runs any pending eviction/expiration work in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        Ok(self.entries.get(key).map(|stored| stored.value))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> BackendResult<()> {
        self.entries.insert(
            key.to_string(),
            StoredValue {
                value: value.clone(),
                ttl: effective_ttl(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.entries.invalidate(key);
        Ok(())
    }

    async fn flush_all(&self) -> BackendResult<()> {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        Ok(())
    }

    async fn stats(&self) -> BackendResult<BackendStats> {
        let key_count = self.len();
        Ok(BackendStats::new(&self.name, key_count)
            .with_detail("type", crate::constants::LOCAL_MEMORY)
            .with_detail("capacity", self.capacity))
    }
}
