//! Tiered cache: local + remote behind one router.

use std::future::Future;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::{CacheError, CacheResult, TierOperation};
use super::options::{CacheOptions, CallOptions, Tier, TierSelection};
use crate::backend::{
    BackendHandle, BackendOptions, BackendResult, BackendStats, CacheBackend, create_backend,
};
use crate::config::{Config, ConfigError};

/// How a tier is supplied at construction.
#[derive(Clone)]
pub enum BackendSpec {
    /// An already constructed backend.
    Handle(BackendHandle),
    /// A factory type name, built with the tier's [`BackendOptions`].
    Named(String),
}

impl From<BackendHandle> for BackendSpec {
    fn from(handle: BackendHandle) -> Self {
        BackendSpec::Handle(handle)
    }
}

impl From<&str> for BackendSpec {
    fn from(type_name: &str) -> Self {
        BackendSpec::Named(type_name.to_string())
    }
}

impl From<String> for BackendSpec {
    fn from(type_name: String) -> Self {
        BackendSpec::Named(type_name)
    }
}

impl std::fmt::Debug for BackendSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendSpec::Handle(handle) => f.debug_tuple("Handle").field(&handle.name()).finish(),
            BackendSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// Routes cache operations to a local and a remote backend.
///
/// Holds no cache state of its own: only the two handles and the defaults
/// resolved at construction. Cloning is cheap and clones share backends.
#[derive(Clone)]
pub struct TieredCache {
    local: BackendHandle,
    remote: BackendHandle,
    defaults: TierSelection,
    default_ttl: Option<Duration>,
    disabled: bool,
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("local", &self.local.name())
            .field("remote", &self.remote.name())
            .field("defaults", &self.defaults)
            .field("default_ttl", &self.default_ttl)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl TieredCache {
    /// Both tiers enabled, no default TTL.
    pub fn new(local: BackendHandle, remote: BackendHandle) -> Self {
        Self::with_options(local, remote, &CacheOptions::default())
    }

    /// Uses the tier defaults, TTL and disabled flag from `options`.
    pub fn with_options(local: BackendHandle, remote: BackendHandle, options: &CacheOptions) -> Self {
        let cache = Self {
            local,
            remote,
            defaults: options.default_selection(),
            default_ttl: options.ttl,
            disabled: options.disabled,
        };
        info!(
            local = cache.local.name(),
            remote = cache.remote.name(),
            use_local = cache.defaults.use_local,
            use_remote = cache.defaults.use_remote,
            default_ttl_secs = cache.default_ttl.map(|ttl| ttl.as_secs()),
            disabled = cache.disabled,
            "tiered cache ready"
        );
        cache
    }

    /// Builds the coordinator from handles and/or factory type names.
    ///
    /// Named tiers are created with `options.local_options` /
    /// `options.remote_options`; an unnamed backend is named after its tier.
    /// Fails on an unknown type name or adapter initialization error.
    pub fn from_specs(
        local: impl Into<BackendSpec>,
        remote: impl Into<BackendSpec>,
        options: CacheOptions,
    ) -> Result<Self, ConfigError> {
        let local = resolve_spec(local.into(), Tier::Local, &options.local_options)?;
        let remote = resolve_spec(remote.into(), Tier::Remote, &options.remote_options)?;
        Ok(Self::with_options(local, remote, &options))
    }

    /// Builds the coordinator described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::from_specs(
            config.local_backend.as_str(),
            config.remote_backend.as_str(),
            config.cache_options(),
        )
    }

    pub fn local(&self) -> &BackendHandle {
        &self.local
    }

    pub fn remote(&self) -> &BackendHandle {
        &self.remote
    }

    pub fn backend(&self, tier: Tier) -> &BackendHandle {
        match tier {
            Tier::Local => &self.local,
            Tier::Remote => &self.remote,
        }
    }

    /// Tier defaults used when a call leaves a flag unset.
    pub fn defaults(&self) -> TierSelection {
        self.defaults
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Resolves the tiers for one call: explicit flag, else instance default.
    pub fn resolve(&self, options: Option<&CallOptions>) -> TierSelection {
        TierSelection::new(
            options
                .and_then(|o| o.use_local_cache)
                .unwrap_or(self.defaults.use_local),
            options
                .and_then(|o| o.use_remote_cache)
                .unwrap_or(self.defaults.use_remote),
        )
    }

    /// Per-call TTL, else the instance default. Zero means no expiration.
    pub fn resolve_ttl(&self, ttl: Option<Duration>) -> Option<Duration> {
        ttl.or(self.default_ttl).filter(|ttl| !ttl.is_zero())
    }

    /// Reads `key`, local first, falling through to remote on a local miss.
    ///
    /// A local backend error is returned as is; remote is not consulted.
    /// With `set_local`, a remote hit is written to local (no TTL) before
    /// returning; a failed promotion is logged and ignored.
    #[instrument(skip(self, options), fields(key = %key))]
    pub async fn get(&self, key: &str, options: Option<&CallOptions>) -> CacheResult<Value> {
        if self.disabled {
            debug!("cache disabled, reporting miss");
            return Err(CacheError::key_not_found());
        }

        let selection = self.resolve(options);
        if selection.is_empty() {
            return Err(CacheError::TierSelection {
                operation: TierOperation::Get,
            });
        }

        if !selection.use_local {
            return self.get_from(Tier::Remote, key).await;
        }

        match self
            .local
            .get(key)
            .await
            .map_err(|source| CacheError::backend(Tier::Local, source))?
        {
            Some(value) => {
                debug!("local hit");
                return Ok(value);
            }
            None if !selection.use_remote => {
                debug!("local miss, remote not selected");
                return Err(CacheError::key_not_found());
            }
            None => debug!("local miss, reading through to remote"),
        }

        let value = self.get_from(Tier::Remote, key).await?;

        if options.is_some_and(|o| o.set_local) {
            if let Err(e) = self.local.set(key, &value, None).await {
                warn!(error = %e, "failed to promote remote hit into local cache");
            } else {
                debug!("promoted remote hit into local cache");
            }
        }

        Ok(value)
    }

    /// Writes `value` to every selected tier concurrently and returns it.
    ///
    /// TTL: `ttl`, else the instance default, else none.
    #[instrument(skip(self, value, options), fields(key = %key))]
    pub async fn set(
        &self,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
        options: Option<&CallOptions>,
    ) -> CacheResult<Value> {
        if self.disabled {
            debug!("cache disabled, skipping set");
            return Ok(value);
        }

        let selection = self.resolve(options);
        if selection.is_empty() {
            return Err(CacheError::TierSelection {
                operation: TierOperation::Set,
            });
        }

        let ttl = self.resolve_ttl(ttl);
        debug!(?selection, ttl_ms = ttl.map(|ttl| ttl.as_millis() as u64), "writing");
        self.fan_out(selection, |backend| backend.set(key, &value, ttl))
            .await?;
        Ok(value)
    }

    /// Removes `key` from every selected tier. Selecting no tier is a no-op.
    #[instrument(skip(self, options), fields(key = %key))]
    pub async fn delete(&self, key: &str, options: Option<&CallOptions>) -> CacheResult<()> {
        if self.disabled {
            return Ok(());
        }

        let selection = self.resolve(options);
        if selection.is_empty() {
            debug!("no tier selected, nothing to delete");
            return Ok(());
        }

        self.fan_out(selection, |backend| backend.delete(key))
            .await
            .map(|_| ())
    }

    /// Clears every selected tier. Selecting no tier is a no-op.
    #[instrument(skip(self, options))]
    pub async fn flush_all(&self, options: Option<&CallOptions>) -> CacheResult<()> {
        if self.disabled {
            return Ok(());
        }

        let selection = self.resolve(options);
        if selection.is_empty() {
            debug!("no tier selected, nothing to flush");
            return Ok(());
        }

        self.fan_out(selection, |backend| backend.flush_all())
            .await
            .map(|_| ())
    }

    /// Collects stats from the selected tiers, local first.
    #[instrument(skip(self, options))]
    pub async fn stats(&self, options: Option<&CallOptions>) -> CacheResult<Vec<BackendStats>> {
        if self.disabled {
            return Ok(Vec::new());
        }

        let selection = self.resolve(options);
        self.fan_out(selection, |backend| backend.stats()).await
    }

    async fn get_from(&self, tier: Tier, key: &str) -> CacheResult<Value> {
        match self.backend(tier).get(key).await {
            Ok(Some(value)) => {
                debug!(%tier, "hit");
                Ok(value)
            }
            Ok(None) => {
                debug!(%tier, "miss");
                Err(CacheError::key_not_found())
            }
            Err(source) => Err(CacheError::backend(tier, source)),
        }
    }

    /// Runs `op` against every selected tier at once and waits for all of them.
    ///
    /// The first failure to complete is returned; later results are dropped
    /// but their operations still run to completion. Successful results come
    /// back local first.
    async fn fan_out<'a, T, F, Fut>(&'a self, selection: TierSelection, op: F) -> CacheResult<Vec<T>>
    where
        F: Fn(&'a BackendHandle) -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        let mut pending: FuturesUnordered<_> = selection
            .tiers()
            .map(|tier| {
                let operation = op(self.backend(tier));
                async move { (tier, operation.await) }
            })
            .collect();

        let mut completed: Vec<(Tier, T)> = Vec::with_capacity(pending.len());
        let mut first_error: Option<CacheError> = None;

        while let Some((tier, outcome)) = pending.next().await {
            match outcome {
                Ok(result) => completed.push((tier, result)),
                Err(source) if first_error.is_none() => {
                    debug!(%tier, error = %source, "tier failed");
                    first_error = Some(CacheError::backend(tier, source));
                }
                Err(source) => {
                    debug!(%tier, error = %source, "discarding later tier failure");
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        completed.sort_by_key(|(tier, _)| *tier);
        Ok(completed.into_iter().map(|(_, result)| result).collect())
    }
}

fn resolve_spec(
    spec: BackendSpec,
    tier: Tier,
    options: &BackendOptions,
) -> Result<BackendHandle, ConfigError> {
    let type_name = match spec {
        BackendSpec::Handle(handle) => return Ok(handle),
        BackendSpec::Named(type_name) => type_name,
    };

    let mut options = options.clone();
    if options.name.is_none() {
        options.name = Some(tier.as_str().to_string());
    }

    match create_backend(&type_name, &options) {
        Ok(Some(handle)) => Ok(handle),
        Ok(None) => Err(ConfigError::UnknownBackend {
            tier,
            name: type_name,
        }),
        Err(source) => Err(ConfigError::BackendInit { tier, source }),
    }
}
