//! Mock backend for coordinator tests.
//!
//! Wraps a [`MemoryBackend`] and adds per-operation fault injection, call
//! counters and artificial latency.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::error::{BackendError, BackendResult};
use super::memory::MemoryBackend;
use super::types::BackendStats;
use super::CacheBackend;

/// Backend operation selector for [`MockBackend`] knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Get,
    Set,
    Delete,
    FlushAll,
    Stats,
}

#[derive(Default)]
struct Counters {
    started: HashMap<MockOp, u64>,
    finished: HashMap<MockOp, u64>,
}

pub struct MockBackend {
    inner: MemoryBackend,
    failing: Mutex<HashSet<MockOp>>,
    latency: Mutex<HashMap<MockOp, Duration>>,
    counters: Mutex<Counters>,
    total_calls: AtomicU64,
}

impl MockBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: MemoryBackend::new(name),
            failing: Mutex::new(HashSet::new()),
            latency: Mutex::new(HashMap::new()),
            counters: Mutex::new(Counters::default()),
            total_calls: AtomicU64::new(0),
        }
    }

    /// Makes every subsequent `op` fail with [`BackendError::Unavailable`].
    pub fn fail_on(&self, op: MockOp) {
        self.failing.lock().insert(op);
    }

    /// Clears a fault injected with [`MockBackend::fail_on`].
    pub fn recover(&self, op: MockOp) {
        self.failing.lock().remove(&op);
    }

    /// Delays every subsequent `op` by `delay` before it runs.
    pub fn delay(&self, op: MockOp, delay: Duration) {
        self.latency.lock().insert(op, delay);
    }

    /// Number of `op` calls that were dispatched.
    pub fn calls(&self, op: MockOp) -> u64 {
        self.counters.lock().started.get(&op).copied().unwrap_or(0)
    }

    /// Number of `op` calls that ran to completion (success or failure).
    pub fn completed(&self, op: MockOp) -> u64 {
        self.counters.lock().finished.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::Relaxed)
    }

    /// Direct access to the wrapped store, bypassing counters and faults.
    pub fn store(&self) -> &MemoryBackend {
        &self.inner
    }

    async fn enter(&self, op: MockOp) -> BackendResult<()> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        *self.counters.lock().started.entry(op).or_default() += 1;

        let delay = self.latency.lock().get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self.failing.lock().contains(&op);
        if failing {
            self.finish(op);
            return Err(BackendError::Unavailable {
                reason: format!("injected {op:?} failure on {}", self.inner.name()),
            });
        }
        Ok(())
    }

    fn finish(&self, op: MockOp) {
        *self.counters.lock().finished.entry(op).or_default() += 1;
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("inner", &self.inner)
            .field("total_calls", &self.total_calls())
            .finish()
    }
}

#[async_trait]
impl CacheBackend for MockBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        self.enter(MockOp::Get).await?;
        let result = self.inner.get(key).await;
        self.finish(MockOp::Get);
        result
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> BackendResult<()> {
        self.enter(MockOp::Set).await?;
        let result = self.inner.set(key, value, ttl).await;
        self.finish(MockOp::Set);
        result
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.enter(MockOp::Delete).await?;
        let result = self.inner.delete(key).await;
        self.finish(MockOp::Delete);
        result
    }

    async fn flush_all(&self) -> BackendResult<()> {
        self.enter(MockOp::FlushAll).await?;
        let result = self.inner.flush_all().await;
        self.finish(MockOp::FlushAll);
        result
    }

    async fn stats(&self) -> BackendResult<BackendStats> {
        self.enter(MockOp::Stats).await?;
        let result = self.inner.stats().await;
        self.finish(MockOp::Stats);
        result
    }
}
