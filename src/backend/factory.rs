use std::sync::Arc;

use tracing::debug;

use super::error::BackendResult;
use super::memory::MemoryBackend;
use super::remote::RedisBackend;
use super::types::BackendOptions;
use super::BackendHandle;
use crate::constants::{DEFAULT_LOCAL_CAPACITY, LOCAL_MEMORY, REMOTE_NETWORK};

const LOCAL_MEMORY_ALIASES: &[&str] = &[LOCAL_MEMORY, "memory"];
const REMOTE_NETWORK_ALIASES: &[&str] = &[REMOTE_NETWORK, "redis"];

/// Returns `true` if [`create_backend`] recognizes `type_name`.
pub fn is_known_backend(type_name: &str) -> bool {
    LOCAL_MEMORY_ALIASES.contains(&type_name) || REMOTE_NETWORK_ALIASES.contains(&type_name)
}

/// Builds a backend from its type name.
///
/// Returns `Ok(None)` for an unrecognized `type_name`; callers decide how to
/// report that. Errors come only from adapter initialization (e.g. an invalid
/// Redis URL).
pub fn create_backend(
    type_name: &str,
    options: &BackendOptions,
) -> BackendResult<Option<BackendHandle>> {
    let name = options.name.as_deref().unwrap_or(type_name);

    if LOCAL_MEMORY_ALIASES.contains(&type_name) {
        let capacity = options.capacity.unwrap_or(DEFAULT_LOCAL_CAPACITY);
        debug!(name, capacity, "creating local-memory backend");
        return Ok(Some(Arc::new(MemoryBackend::with_capacity(name, capacity))));
    }

    if REMOTE_NETWORK_ALIASES.contains(&type_name) {
        debug!(name, url = ?options.url, "creating remote-network backend");
        return Ok(Some(Arc::new(RedisBackend::from_options(name, options)?)));
    }

    Ok(None)
}
