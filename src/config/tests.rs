use super::*;
use serial_test::serial;
use std::env;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_tiercache_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("TIERCACHE_LOCAL_BACKEND");
        env::remove_var("TIERCACHE_REMOTE_BACKEND");
        env::remove_var("TIERCACHE_USE_LOCAL");
        env::remove_var("TIERCACHE_USE_REMOTE");
        env::remove_var("TIERCACHE_DEFAULT_TTL_SECS");
        env::remove_var("TIERCACHE_DISABLED");
        env::remove_var("TIERCACHE_LOCAL_CAPACITY");
        env::remove_var("TIERCACHE_REDIS_URL");
        env::remove_var("TIERCACHE_REDIS_POOL_SIZE");
        env::remove_var("TIERCACHE_REDIS_TIMEOUT_MS");
        env::remove_var("TIERCACHE_REDIS_KEY_PREFIX");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.local_backend, "local-memory");
    assert_eq!(config.remote_backend, "remote-network");
    assert!(config.use_local_cache);
    assert!(config.use_remote_cache);
    assert!(config.default_ttl.is_none());
    assert!(!config.disabled);
    assert_eq!(config.local_capacity, 10_000);
    assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
    assert_eq!(config.redis_pool_size, 16);
    assert_eq!(config.redis_timeout, Duration::from_secs(1));
    assert!(config.redis_key_prefix.is_none());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_tiercache_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_tiercache_env();

    let config = with_env_vars(
        &[
            ("TIERCACHE_LOCAL_BACKEND", "memory"),
            ("TIERCACHE_REMOTE_BACKEND", "redis"),
            ("TIERCACHE_USE_LOCAL", "false"),
            ("TIERCACHE_USE_REMOTE", "YES"),
            ("TIERCACHE_DEFAULT_TTL_SECS", "30"),
            ("TIERCACHE_DISABLED", "0"),
            ("TIERCACHE_LOCAL_CAPACITY", "512"),
            ("TIERCACHE_REDIS_URL", "redis://cache.internal:6380/2"),
            ("TIERCACHE_REDIS_POOL_SIZE", "4"),
            ("TIERCACHE_REDIS_TIMEOUT_MS", "250"),
            ("TIERCACHE_REDIS_KEY_PREFIX", "app:"),
        ],
        Config::from_env,
    )
    .expect("should parse overrides");

    assert_eq!(config.local_backend, "memory");
    assert_eq!(config.remote_backend, "redis");
    assert!(!config.use_local_cache);
    assert!(config.use_remote_cache);
    assert_eq!(config.default_ttl, Some(Duration::from_secs(30)));
    assert!(!config.disabled);
    assert_eq!(config.local_capacity, 512);
    assert_eq!(config.redis_url, "redis://cache.internal:6380/2");
    assert_eq!(config.redis_pool_size, 4);
    assert_eq!(config.redis_timeout, Duration::from_millis(250));
    assert_eq!(config.redis_key_prefix.as_deref(), Some("app:"));
}

#[test]
#[serial]
fn test_blank_values_fall_back_to_defaults() {
    clear_tiercache_env();

    let config = with_env_vars(
        &[
            ("TIERCACHE_LOCAL_BACKEND", "   "),
            ("TIERCACHE_REDIS_KEY_PREFIX", ""),
            ("TIERCACHE_DEFAULT_TTL_SECS", ""),
        ],
        Config::from_env,
    )
    .expect("blank values are treated as unset");

    assert_eq!(config.local_backend, "local-memory");
    assert!(config.redis_key_prefix.is_none());
    assert!(config.default_ttl.is_none());
}

#[test]
#[serial]
fn test_invalid_bool_is_rejected() {
    clear_tiercache_env();

    let result = with_env_vars(&[("TIERCACHE_DISABLED", "maybe")], Config::from_env);

    match result {
        Err(ConfigError::InvalidBool { var, value }) => {
            assert_eq!(var, "TIERCACHE_DISABLED");
            assert_eq!(value, "maybe");
        }
        other => panic!("expected InvalidBool, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_invalid_number_is_rejected() {
    clear_tiercache_env();

    let result = with_env_vars(&[("TIERCACHE_DEFAULT_TTL_SECS", "-5")], Config::from_env);

    assert!(matches!(
        result,
        Err(ConfigError::InvalidNumber {
            var: "TIERCACHE_DEFAULT_TTL_SECS",
            ..
        })
    ));
}

#[test]
fn test_validate_rejects_unknown_backend() {
    let config = Config {
        remote_backend: "memcached".to_string(),
        ..Default::default()
    };

    let err = config.validate().expect_err("memcached is not supported");
    assert!(matches!(
        err,
        ConfigError::UnknownBackend {
            tier: Tier::Remote,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "unsupported remote cache backend type 'memcached'"
    );
}

#[test]
fn test_validate_rejects_zero_limits() {
    let config = Config {
        local_capacity: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroValue {
            var: "TIERCACHE_LOCAL_CAPACITY"
        })
    ));

    let config = Config {
        redis_pool_size: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroValue {
            var: "TIERCACHE_REDIS_POOL_SIZE"
        })
    ));
}

#[test]
fn test_cache_options_carry_tier_defaults_and_backend_options() {
    let config = Config {
        use_remote_cache: false,
        default_ttl: Some(Duration::from_secs(60)),
        redis_key_prefix: Some("svc:".to_string()),
        ..Default::default()
    };

    let options = config.cache_options();

    assert_eq!(options.use_local_cache, Some(true));
    assert_eq!(options.use_remote_cache, Some(false));
    assert_eq!(options.ttl, Some(Duration::from_secs(60)));
    assert_eq!(options.local_options.name.as_deref(), Some("local"));
    assert_eq!(options.remote_options.name.as_deref(), Some("remote"));
    assert_eq!(options.remote_options.key_prefix.as_deref(), Some("svc:"));
    assert_eq!(
        options.remote_options.url.as_deref(),
        Some("redis://127.0.0.1:6379")
    );
    assert!(!options.disabled);
}
