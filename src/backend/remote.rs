//! `remote-network` adapter (Redis).
//!
//! Values are stored as JSON text. With a key prefix configured, every key is
//! namespaced and `flush_all`/`stats` only touch the prefixed keyspace;
//! without one they act on the whole logical database.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use serde_json::Value;
use tracing::debug;

use super::error::{BackendError, BackendResult};
use super::types::{BackendOptions, BackendStats, effective_ttl};
use super::CacheBackend;
use crate::constants::{
    DEFAULT_REDIS_POOL_SIZE, DEFAULT_REDIS_TIMEOUT, DEFAULT_REDIS_URL, REMOTE_NETWORK,
    SCAN_BATCH_SIZE,
};

/// Redis-backed store sharing a pooled set of connections.
#[derive(Clone)]
pub struct RedisBackend {
    name: String,
    pool: Pool,
    key_prefix: Option<String>,
}

impl RedisBackend {
    /// Wraps an existing pool.
    pub fn new(name: impl Into<String>, pool: Pool) -> Self {
        Self {
            name: name.into(),
            pool,
            key_prefix: None,
        }
    }

    /// Namespaces every key under `prefix`. An empty prefix is ignored.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.key_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Builds a pool from `options` without connecting.
    ///
    /// Connections are established lazily; an unreachable server surfaces as
    /// [`BackendError::Connection`] on first use.
    pub fn from_options(name: impl Into<String>, options: &BackendOptions) -> BackendResult<Self> {
        let url = options.url.as_deref().unwrap_or(DEFAULT_REDIS_URL);
        let timeout = options.timeout.unwrap_or(DEFAULT_REDIS_TIMEOUT);

        let mut pool_config = PoolConfig::new(options.pool_size.unwrap_or(DEFAULT_REDIS_POOL_SIZE));
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);

        let mut redis_config = deadpool_redis::Config::from_url(url);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| BackendError::Connection {
                reason: format!("failed to create Redis pool for {url}: {e}"),
            })?;

        let backend = Self::new(name, pool);
        Ok(match options.key_prefix.as_deref() {
            Some(prefix) => backend.with_key_prefix(prefix),
            None => backend,
        })
    }

    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Returns `true` if a pooled connection can be obtained.
    pub async fn is_available(&self) -> bool {
        self.pool.get().await.is_ok()
    }

    async fn connection(&self) -> BackendResult<Connection> {
        self.pool.get().await.map_err(|e| BackendError::Connection {
            reason: e.to_string(),
        })
    }

    fn namespaced<'a>(&self, key: &'a str) -> Cow<'a, str> {
        namespaced_key(self.key_prefix.as_deref(), key)
    }

    async fn prefixed_keys(&self, conn: &mut Connection, prefix: &str) -> BackendResult<Vec<String>> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut *conn)
                .await
                .map_err(|e| BackendError::command("SCAN", e))?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .field("pool_max_size", &self.pool.status().max_size)
            .finish()
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(self.namespaced(key).as_ref())
            .await
            .map_err(|e| BackendError::command("GET", e))?;

        Ok(raw.map(|text| serde_json::from_str(&text)).transpose()?)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> BackendResult<()> {
        let payload = serde_json::to_string(value)?;
        let key = self.namespaced(key);
        let mut conn = self.connection().await?;

        match effective_ttl(ttl) {
            Some(ttl) => {
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                let _: () = redis::cmd("SET")
                    .arg(key.as_ref())
                    .arg(payload)
                    .arg("PX")
                    .arg(millis)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| BackendError::command("SET", e))?;
                Ok(())
            }
            // Plain SET also clears any TTL left by a previous write.
            None => conn
                .set::<_, _, ()>(key.as_ref(), payload)
                .await
                .map_err(|e| BackendError::command("SET", e)),
        }
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(self.namespaced(key).as_ref())
            .await
            .map_err(|e| BackendError::command("DEL", e))
    }

    async fn flush_all(&self) -> BackendResult<()> {
        let mut conn = self.connection().await?;

        match self.key_prefix.as_deref() {
            Some(prefix) => {
                let keys = self.prefixed_keys(&mut conn, prefix).await?;
                debug!(prefix, keys = keys.len(), "flushing prefixed keyspace");
                for chunk in keys.chunks(SCAN_BATCH_SIZE) {
                    conn.del::<_, ()>(chunk.to_vec())
                        .await
                        .map_err(|e| BackendError::command("DEL", e))?;
                }
                Ok(())
            }
            None => {
                let _: () = redis::cmd("FLUSHDB")
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| BackendError::command("FLUSHDB", e))?;
                Ok(())
            }
        }
    }

    async fn stats(&self) -> BackendResult<BackendStats> {
        let mut conn = self.connection().await?;

        let key_count = match self.key_prefix.as_deref() {
            Some(prefix) => self.prefixed_keys(&mut conn, prefix).await?.len() as u64,
            None => redis::cmd("DBSIZE")
                .query_async(&mut conn)
                .await
                .map_err(|e| BackendError::command("DBSIZE", e))?,
        };

        let status = self.pool.status();
        Ok(BackendStats::new(&self.name, key_count)
            .with_detail("type", REMOTE_NETWORK)
            .with_detail("keyPrefix", self.key_prefix.clone())
            .with_detail("poolMaxSize", status.max_size)
            .with_detail("poolSize", status.size))
    }
}

pub(crate) fn namespaced_key<'a>(prefix: Option<&str>, key: &'a str) -> Cow<'a, str> {
    match prefix {
        Some(prefix) => Cow::Owned(format!("{prefix}{key}")),
        None => Cow::Borrowed(key),
    }
}

/// Escapes Redis glob metacharacters so `prefix` matches literally.
pub(crate) fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
