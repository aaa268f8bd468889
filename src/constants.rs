//! Cross-cutting, shared constants.
//!
//! Adapter defaults live here so the factory, [`crate::config::Config`] and the
//! adapters themselves agree on them.

use std::time::Duration;

/// Factory type name of the in-process adapter.
pub const LOCAL_MEMORY: &str = "local-memory";
/// Factory type name of the Redis adapter.
pub const REMOTE_NETWORK: &str = "remote-network";

/// Max entries held by a `local-memory` backend unless configured otherwise.
pub const DEFAULT_LOCAL_CAPACITY: u64 = 10_000;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_REDIS_POOL_SIZE: usize = 16;
pub const DEFAULT_REDIS_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_REDIS_TIMEOUT: Duration = Duration::from_millis(DEFAULT_REDIS_TIMEOUT_MS);

/// `COUNT` hint for `SCAN` when walking a key prefix.
pub const SCAN_BATCH_SIZE: usize = 500;

/// Message carried by [`crate::cache::CacheError::KeyNotFound`] when none is given.
pub const KEY_NOT_FOUND_MESSAGE: &str = "key not found in cache";
