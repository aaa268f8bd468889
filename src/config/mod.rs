//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TIERCACHE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::time::Duration;

use crate::backend::{BackendOptions, is_known_backend};
use crate::cache::{CacheOptions, Tier};
use crate::constants::{
    DEFAULT_LOCAL_CAPACITY, DEFAULT_REDIS_POOL_SIZE, DEFAULT_REDIS_TIMEOUT_MS, DEFAULT_REDIS_URL,
    LOCAL_MEMORY, REMOTE_NETWORK,
};

/// Coordinator configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TIERCACHE_*` overrides on top of defaults,
/// then [`crate::TieredCache::from_config`] to build the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Factory type of the local tier. Default: `local-memory`.
    pub local_backend: String,

    /// Factory type of the remote tier. Default: `remote-network`.
    pub remote_backend: String,

    /// Whether calls use the local tier unless told otherwise. Default: `true`.
    pub use_local_cache: bool,

    /// Whether calls use the remote tier unless told otherwise. Default: `true`.
    pub use_remote_cache: bool,

    /// TTL applied to writes that pass none. Default: none (no expiration).
    pub default_ttl: Option<Duration>,

    /// Turn the coordinator into a no-op. Default: `false`.
    pub disabled: bool,

    /// Max entries in a `local-memory` tier. Default: `10_000`.
    pub local_capacity: u64,

    /// Redis URL for a `remote-network` tier. Default: `redis://127.0.0.1:6379`.
    pub redis_url: String,

    /// Max pooled Redis connections. Default: `16`.
    pub redis_pool_size: usize,

    /// Pool wait/create/recycle timeout. Default: 1s.
    pub redis_timeout: Duration,

    /// Namespace prepended to every remote key. Default: none.
    pub redis_key_prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_backend: LOCAL_MEMORY.to_string(),
            remote_backend: REMOTE_NETWORK.to_string(),
            use_local_cache: true,
            use_remote_cache: true,
            default_ttl: None,
            disabled: false,
            local_capacity: DEFAULT_LOCAL_CAPACITY,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            redis_pool_size: DEFAULT_REDIS_POOL_SIZE,
            redis_timeout: Duration::from_millis(DEFAULT_REDIS_TIMEOUT_MS),
            redis_key_prefix: None,
        }
    }
}

impl Config {
    const ENV_LOCAL_BACKEND: &'static str = "TIERCACHE_LOCAL_BACKEND";
    const ENV_REMOTE_BACKEND: &'static str = "TIERCACHE_REMOTE_BACKEND";
    const ENV_USE_LOCAL: &'static str = "TIERCACHE_USE_LOCAL";
    const ENV_USE_REMOTE: &'static str = "TIERCACHE_USE_REMOTE";
    const ENV_DEFAULT_TTL_SECS: &'static str = "TIERCACHE_DEFAULT_TTL_SECS";
    const ENV_DISABLED: &'static str = "TIERCACHE_DISABLED";
    const ENV_LOCAL_CAPACITY: &'static str = "TIERCACHE_LOCAL_CAPACITY";
    const ENV_REDIS_URL: &'static str = "TIERCACHE_REDIS_URL";
    const ENV_REDIS_POOL_SIZE: &'static str = "TIERCACHE_REDIS_POOL_SIZE";
    const ENV_REDIS_TIMEOUT_MS: &'static str = "TIERCACHE_REDIS_TIMEOUT_MS";
    const ENV_REDIS_KEY_PREFIX: &'static str = "TIERCACHE_REDIS_KEY_PREFIX";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let local_backend = Self::parse_string_from_env(Self::ENV_LOCAL_BACKEND, defaults.local_backend);
        let remote_backend =
            Self::parse_string_from_env(Self::ENV_REMOTE_BACKEND, defaults.remote_backend);
        let use_local_cache = Self::parse_bool_from_env(Self::ENV_USE_LOCAL, defaults.use_local_cache)?;
        let use_remote_cache =
            Self::parse_bool_from_env(Self::ENV_USE_REMOTE, defaults.use_remote_cache)?;
        let default_ttl = Self::parse_optional_u64_from_env(Self::ENV_DEFAULT_TTL_SECS)?
            .map(Duration::from_secs)
            .or(defaults.default_ttl);
        let disabled = Self::parse_bool_from_env(Self::ENV_DISABLED, defaults.disabled)?;
        let local_capacity = Self::parse_optional_u64_from_env(Self::ENV_LOCAL_CAPACITY)?
            .unwrap_or(defaults.local_capacity);
        let redis_url = Self::parse_string_from_env(Self::ENV_REDIS_URL, defaults.redis_url);
        let redis_pool_size = Self::parse_optional_u64_from_env(Self::ENV_REDIS_POOL_SIZE)?
            .map(|size| size as usize)
            .unwrap_or(defaults.redis_pool_size);
        let redis_timeout = Self::parse_optional_u64_from_env(Self::ENV_REDIS_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.redis_timeout);
        let redis_key_prefix = Self::parse_optional_string_from_env(Self::ENV_REDIS_KEY_PREFIX);

        Ok(Self {
            local_backend,
            remote_backend,
            use_local_cache,
            use_remote_cache,
            default_ttl,
            disabled,
            local_capacity,
            redis_url,
            redis_pool_size,
            redis_timeout,
            redis_key_prefix,
        })
    }

    /// Checks backend names and numeric limits (does not connect anywhere).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_known_backend(&self.local_backend) {
            return Err(ConfigError::UnknownBackend {
                tier: Tier::Local,
                name: self.local_backend.clone(),
            });
        }
        if !is_known_backend(&self.remote_backend) {
            return Err(ConfigError::UnknownBackend {
                tier: Tier::Remote,
                name: self.remote_backend.clone(),
            });
        }
        if self.local_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                var: Self::ENV_LOCAL_CAPACITY,
            });
        }
        if self.redis_pool_size == 0 {
            return Err(ConfigError::ZeroValue {
                var: Self::ENV_REDIS_POOL_SIZE,
            });
        }
        Ok(())
    }

    /// Instance options for the coordinator, including per-tier factory options.
    pub fn cache_options(&self) -> CacheOptions {
        let backend_options = |tier: Tier| BackendOptions {
            name: Some(tier.as_str().to_string()),
            capacity: Some(self.local_capacity),
            url: Some(self.redis_url.clone()),
            pool_size: Some(self.redis_pool_size),
            timeout: Some(self.redis_timeout),
            key_prefix: self.redis_key_prefix.clone(),
        };

        CacheOptions {
            use_local_cache: Some(self.use_local_cache),
            use_remote_cache: Some(self.use_remote_cache),
            ttl: self.default_ttl,
            local_options: backend_options(Tier::Local),
            remote_options: backend_options(Tier::Remote),
            disabled: self.disabled,
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    var: var_name,
                    value,
                }),
            },
            None => Ok(default),
        }
    }

    fn parse_optional_u64_from_env(var_name: &'static str) -> Result<Option<u64>, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::InvalidNumber {
                    var: var_name,
                    value,
                    source: e,
                }),
            None => Ok(None),
        }
    }
}
