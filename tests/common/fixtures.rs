//! Test fixtures for integration tests.

use std::sync::Arc;

use serde_json::{Value, json};
use tiercache::{CacheOptions, MemoryBackend, MockBackend, TieredCache};

pub const TEST_REDIS_URL_VAR: &str = "TIERCACHE_TEST_REDIS_URL";

/// A coordinator over two mock tiers, with the mocks kept for inspection.
pub struct MockTiers {
    pub local: Arc<MockBackend>,
    pub remote: Arc<MockBackend>,
    pub cache: TieredCache,
}

impl MockTiers {
    pub fn new() -> Self {
        Self::with_options(CacheOptions::default())
    }

    pub fn with_options(options: CacheOptions) -> Self {
        let local = Arc::new(MockBackend::new("local"));
        let remote = Arc::new(MockBackend::new("remote"));
        let cache = TieredCache::with_options(local.clone(), remote.clone(), &options);
        Self {
            local,
            remote,
            cache,
        }
    }
}

/// Coordinator over two independent in-memory tiers.
pub fn memory_cache() -> TieredCache {
    TieredCache::new(
        Arc::new(MemoryBackend::new("local")),
        Arc::new(MemoryBackend::new("remote")),
    )
}

/// A mix of structured and falsy payloads keyed by a stable name.
pub fn sample_values() -> Vec<(&'static str, Value)> {
    vec![
        ("user:1", json!({"id": 1, "name": "Ada", "roles": ["admin"]})),
        ("counter", json!(0)),
        ("flag", json!(false)),
        ("note", json!("")),
        ("list", json!([1, 2, 3])),
        ("nothing", json!(null)),
    ]
}

/// Redis URL for live tests, if one is configured.
pub fn redis_url() -> Option<String> {
    std::env::var(TEST_REDIS_URL_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// A key prefix unique to this test run so live tests do not collide.
pub fn unique_prefix(test: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("tiercache-test:{test}:{}:{nanos}:", std::process::id())
}
