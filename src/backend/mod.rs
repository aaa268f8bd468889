//! Backend capability contract and the bundled adapters.
//!
//! The coordinator only ever talks to [`CacheBackend`]. `local-memory` is an
//! in-process moka store; `remote-network` is Redis behind a deadpool pool.

pub mod error;
pub mod factory;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod remote;
pub mod types;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use error::{BackendError, BackendResult};
pub use factory::{create_backend, is_known_backend};
pub use memory::MemoryBackend;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBackend, MockOp};
pub use remote::RedisBackend;
pub use types::{BackendOptions, BackendStats};

#[async_trait]
/// Operations every cache tier must support.
pub trait CacheBackend: Send + Sync {
    /// Name reported in [`BackendStats`].
    fn name(&self) -> &str;

    /// Returns `Ok(None)` when the key is absent or expired.
    async fn get(&self, key: &str) -> BackendResult<Option<Value>>;

    /// Stores `value`, replacing any previous value and TTL.
    ///
    /// `None` or a zero TTL means the entry never expires.
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> BackendResult<()>;

    /// Removes `key`. Succeeds whether or not the key existed.
    async fn delete(&self, key: &str) -> BackendResult<()>;

    /// Removes every key owned by this backend.
    async fn flush_all(&self) -> BackendResult<()>;

    async fn stats(&self) -> BackendResult<BackendStats>;
}

/// Shared reference to a backend; may be held by several coordinators.
pub type BackendHandle = Arc<dyn CacheBackend>;
