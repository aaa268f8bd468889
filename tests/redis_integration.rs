//! Live Redis tests. Run with a server and
//! `TIERCACHE_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::{redis_url, sample_values, unique_prefix};
use serde_json::json;
use tiercache::{
    BackendOptions, CacheBackend, CallOptions, MemoryBackend, RedisBackend, TieredCache,
};

fn redis_backend(test: &str) -> Option<RedisBackend> {
    let Some(url) = redis_url() else {
        eprintln!("skipping: TIERCACHE_TEST_REDIS_URL not set");
        return None;
    };
    let options = BackendOptions {
        url: Some(url),
        key_prefix: Some(unique_prefix(test)),
        pool_size: Some(4),
        ..BackendOptions::named("remote")
    };
    Some(RedisBackend::from_options("remote", &options).expect("pool should build"))
}

#[tokio::test]
#[ignore]
async fn test_redis_round_trips_json_values() {
    let Some(backend) = redis_backend("round-trip") else {
        return;
    };
    assert!(backend.is_available().await, "Redis should be reachable");

    for (key, value) in sample_values() {
        backend.set(key, &value, None).await.expect("set");
        assert_eq!(backend.get(key).await.expect("get"), Some(value));
    }

    assert!(backend.get("absent").await.unwrap().is_none());
    backend.flush_all().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_redis_ttl_and_overwrite() {
    let Some(backend) = redis_backend("ttl") else {
        return;
    };

    backend
        .set("short", &json!("v"), Some(Duration::from_millis(200)))
        .await
        .unwrap();
    backend
        .set("kept", &json!(1), Some(Duration::from_millis(200)))
        .await
        .unwrap();
    backend.set("kept", &json!(2), None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(backend.get("short").await.unwrap().is_none());
    assert_eq!(backend.get("kept").await.unwrap(), Some(json!(2)));
    backend.flush_all().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_redis_prefixed_flush_and_stats() {
    let Some(backend) = redis_backend("flush") else {
        return;
    };

    for i in 0..3 {
        backend.set(&format!("key-{i}"), &json!(i), None).await.unwrap();
    }
    backend.delete("key-0").await.unwrap();
    backend.delete("key-0").await.expect("delete is idempotent");

    let stats = backend.stats().await.unwrap();
    assert_eq!(stats.key_count, 2);
    assert_eq!(stats.backend_specific["type"], json!("remote-network"));

    backend.flush_all().await.unwrap();
    assert_eq!(backend.stats().await.unwrap().key_count, 0);
}

#[tokio::test]
#[ignore]
async fn test_tiered_cache_over_redis() {
    let Some(backend) = redis_backend("tiered") else {
        return;
    };
    let remote = Arc::new(backend);
    let cache = TieredCache::new(Arc::new(MemoryBackend::new("local")), remote.clone());

    cache.set("k", json!({"a": 1}), None, None).await.unwrap();
    cache
        .flush_all(Some(&CallOptions::local_only()))
        .await
        .unwrap();

    assert_eq!(
        cache.get("k", Some(&CallOptions::promote())).await.unwrap(),
        json!({"a": 1})
    );
    assert_eq!(
        cache.get("k", Some(&CallOptions::local_only())).await.unwrap(),
        json!({"a": 1})
    );

    cache.flush_all(None).await.unwrap();
    assert!(cache.get("k", None).await.unwrap_err().is_key_not_found());
}

#[tokio::test]
async fn test_unreachable_redis_fails_on_first_use() {
    let options = BackendOptions {
        url: Some("redis://127.0.0.1:1".to_string()),
        timeout: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let backend = RedisBackend::from_options("remote", &options).expect("pool creation is lazy");

    assert!(!backend.is_available().await);
    let err = backend.get("k").await.expect_err("no server listening");
    assert!(matches!(err, tiercache::BackendError::Connection { .. }));
}
