//! Tiered cache coordinator: one API over a local and a remote cache backend.
//!
//! # Public API Surface
//!
//! ## Coordinator
//! - [`TieredCache`] - Routes get/set/delete/flush/stats across the two tiers
//! - [`CallOptions`], [`CacheOptions`] - Per-call and per-instance routing options
//! - [`Tier`], [`TierSelection`], [`BackendSpec`] - Tier identifiers and construction inputs
//! - [`CacheError`], [`CacheResult`] - Coordinator errors (miss, tier selection, backend)
//!
//! ## Backends
//! - [`CacheBackend`], [`BackendHandle`] - The contract every tier implements
//! - [`MemoryBackend`] - In-process `local-memory` tier
//! - [`RedisBackend`] - Pooled `remote-network` tier
//! - [`create_backend`] - Factory from type name to backend
//!
//! ## Configuration
//! - [`Config`], [`ConfigError`] - `TIERCACHE_*` environment configuration
//!
//! ## Test/Mock Support
//! [`MockBackend`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod backend;
pub mod cache;
pub mod config;
pub mod constants;

pub use backend::{
    BackendError, BackendHandle, BackendOptions, BackendResult, BackendStats, CacheBackend,
    MemoryBackend, RedisBackend, create_backend, is_known_backend,
};
#[cfg(any(test, feature = "mock"))]
pub use backend::{MockBackend, MockOp};
pub use cache::{
    BackendSpec, CacheError, CacheOptions, CacheResult, CallOptions, Tier, TierOperation,
    TierSelection, TieredCache,
};
pub use config::{Config, ConfigError};
pub use constants::{LOCAL_MEMORY, REMOTE_NETWORK};
