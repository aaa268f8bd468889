//! tiercache probe: runs one coordinator operation configured from the environment.

use std::time::Duration;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;
use serde_json::Value;

use tiercache::{CallOptions, Config, TieredCache};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: tiercache [--local-only|--remote-only] [--set-local] \
<get KEY | set KEY VALUE [TTL_SECS] | del KEY | flush | stats>";

#[derive(Debug, PartialEq)]
enum Command {
    Get(String),
    Set {
        key: String,
        value: Value,
        ttl: Option<Duration>,
    },
    Delete(String),
    Flush,
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (command, options) = parse_args(std::env::args().skip(1))?;

    let config = Config::from_env()?;
    let cache = TieredCache::from_config(&config)?;
    tracing::debug!(?command, ?options, "running probe command");

    let output = match command {
        Command::Get(key) => cache.get(&key, Some(&options)).await?,
        Command::Set { key, value, ttl } => cache.set(&key, value, ttl, Some(&options)).await?,
        Command::Delete(key) => {
            cache.delete(&key, Some(&options)).await?;
            serde_json::json!({ "deleted": key })
        }
        Command::Flush => {
            cache.flush_all(Some(&options)).await?;
            serde_json::json!({ "flushed": true })
        }
        Command::Stats => serde_json::to_value(cache.stats(Some(&options)).await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<(Command, CallOptions)> {
    let mut options = CallOptions::default();
    let mut positional = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--local-only" => options = CallOptions::local_only().with_set_local(options.set_local),
            "--remote-only" => {
                options = CallOptions::remote_only().with_set_local(options.set_local)
            }
            "--set-local" => options.set_local = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag '{flag}'\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(verb) = positional.next() else {
        bail!(USAGE);
    };
    let mut key = || positional.next().with_context(|| format!("'{verb}' needs a key"));

    let command = match verb.as_str() {
        "get" => Command::Get(key()?),
        "set" => {
            let key_arg = key()?;
            let raw = positional.next().context("'set' needs a value")?;
            let ttl = positional
                .next()
                .map(|secs| secs.parse::<u64>().map(Duration::from_secs))
                .transpose()
                .context("TTL must be a whole number of seconds")?;
            Command::Set {
                key: key_arg,
                value: parse_value(raw),
                ttl,
            }
        }
        "del" | "delete" => Command::Delete(key()?),
        "flush" => Command::Flush,
        "stats" => Command::Stats,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument '{extra}'\n{USAGE}");
    }

    Ok((command, options))
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_get_defaults_to_instance_tiers() {
        let (command, options) = parse_args(args(&["get", "user:1"])).unwrap();

        assert_eq!(command, Command::Get("user:1".to_string()));
        assert_eq!(options, CallOptions::default());
    }

    #[test]
    fn test_parse_set_with_json_value_and_ttl() {
        let (command, options) =
            parse_args(args(&["--remote-only", "set", "k", "{\"n\":1}", "30"])).unwrap();

        assert_eq!(
            command,
            Command::Set {
                key: "k".to_string(),
                value: serde_json::json!({"n": 1}),
                ttl: Some(Duration::from_secs(30)),
            }
        );
        assert_eq!(options, CallOptions::remote_only());
    }

    #[test]
    fn test_parse_set_keeps_plain_text_as_string() {
        let (command, _) = parse_args(args(&["set", "k", "hello"])).unwrap();

        assert!(matches!(command, Command::Set { value: Value::String(ref s), ttl: None, .. } if s == "hello"));
    }

    #[test]
    fn test_parse_set_local_survives_tier_flag() {
        let (_, options) = parse_args(args(&["--set-local", "--local-only", "get", "k"])).unwrap();

        assert!(options.set_local);
        assert_eq!(options.use_remote_cache, Some(false));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["get"])).is_err());
        assert!(parse_args(args(&["set", "k", "v", "soon"])).is_err());
        assert!(parse_args(args(&["frobnicate"])).is_err());
        assert!(parse_args(args(&["--verbose", "stats"])).is_err());
        assert!(parse_args(args(&["flush", "extra"])).is_err());
    }
}
