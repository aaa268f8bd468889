use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Snapshot of a backend's identity and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStats {
    pub name: String,
    pub key_count: u64,
    /// Adapter-specific details (capacity, pool status, key prefix, ...).
    #[serde(default)]
    pub backend_specific: Value,
}

impl BackendStats {
    pub fn new(name: impl Into<String>, key_count: u64) -> Self {
        Self {
            name: name.into(),
            key_count,
            backend_specific: Value::Object(Map::new()),
        }
    }

    /// Adds one adapter-specific field.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.backend_specific.is_object() {
            self.backend_specific = Value::Object(Map::new());
        }
        if let Value::Object(ref mut details) = self.backend_specific {
            details.insert(key.to_string(), value.into());
        }
        self
    }
}

/// Construction options handed to [`super::create_backend`].
///
/// Each adapter reads the fields it understands and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOptions {
    /// Name reported by `stats()`. Defaults to the tier or type name.
    pub name: Option<String>,
    /// `local-memory`: max entry count.
    pub capacity: Option<u64>,
    /// `remote-network`: Redis connection URL.
    pub url: Option<String>,
    /// `remote-network`: max pooled connections.
    pub pool_size: Option<usize>,
    /// `remote-network`: wait/create/recycle timeout for pooled connections.
    pub timeout: Option<Duration>,
    /// `remote-network`: namespace prepended to every key.
    pub key_prefix: Option<String>,
}

impl BackendOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Returns the TTL a backend should apply; zero means "no expiration".
#[inline]
pub(crate) fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero())
}
