//! Configuration loading from files and environment variables
//!
//! Environment variables take precedence over the file for container
//! deployments:
//! - `FDFS_ENABLE` - `true`/`false`
//! - `FDFS_TRACKERS` - comma-joined `host:port` list
//! - `FDFS_MIN_POOL_SIZE`, `FDFS_MAX_POOL_SIZE`
//! - `FDFS_WAIT_TIMEOUT` - seconds

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::time::Duration;

use super::types::{Config, PoolSettings, TrackerList};

/// Where the effective configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from a TOML file (possibly with env overrides)
    File,
    /// No file; defaults plus environment variables
    Environment,
}

impl ConfigSource {
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::File => "configuration file",
            Self::Environment => "defaults and environment variables",
        }
    }
}

/// Parse an environment variable; unset is `None`, unparsable is an error
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| anyhow!("Invalid value for {}: {:?}", key, raw))
}

/// Whether any pool-related environment variable is set
#[must_use]
pub fn has_pool_env_vars() -> bool {
    [
        "FDFS_ENABLE",
        "FDFS_TRACKERS",
        "FDFS_MIN_POOL_SIZE",
        "FDFS_MAX_POOL_SIZE",
        "FDFS_WAIT_TIMEOUT",
    ]
    .iter()
    .any(|key| std::env::var_os(key).is_some())
}

/// Apply environment overrides on top of file or default settings
fn apply_env_overrides(settings: &mut PoolSettings) -> Result<()> {
    if let Some(enable) = env_parse::<bool>("FDFS_ENABLE")? {
        settings.enable = enable;
    }
    if let Ok(trackers) = std::env::var("FDFS_TRACKERS") {
        tracing::info!("Using tracker list from FDFS_TRACKERS (overriding config file)");
        settings.trackers = TrackerList::Joined(trackers);
    }
    if let Some(min) = env_parse::<usize>("FDFS_MIN_POOL_SIZE")? {
        settings.min_pool_size = min;
    }
    if let Some(max) = env_parse::<usize>("FDFS_MAX_POOL_SIZE")? {
        settings.max_pool_size = max;
    }
    if let Some(secs) = env_parse::<u64>("FDFS_WAIT_TIMEOUT")? {
        settings.wait_timeout = Duration::from_secs(secs);
    }
    Ok(())
}

/// Load configuration from a TOML file, with environment variable overrides
///
/// The tracker list is validated here too, so a malformed file fails at
/// startup rather than on the first checkout.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<Config> {
    let path = config_path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

    apply_env_overrides(&mut config.pool)
        .with_context(|| format!("Failed to apply environment overrides to '{}'", path.display()))?;

    if config.pool.enable {
        config.pool.to_pool_config()?;
    }

    Ok(config)
}

/// Load configuration from environment variables only
pub fn load_config_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config.pool)?;
    if config.pool.enable {
        config.pool.to_pool_config()?;
    }
    Ok(config)
}

/// Load from the file when it exists, otherwise from defaults plus environment
pub fn load_config_with_fallback(config_path: impl AsRef<Path>) -> Result<(Config, ConfigSource)> {
    let path = config_path.as_ref();
    if path.exists() {
        Ok((load_config(path)?, ConfigSource::File))
    } else {
        tracing::warn!(
            "Config file '{}' not found, using defaults and environment variables",
            path.display()
        );
        if !has_pool_env_vars() {
            tracing::warn!("No FDFS_* environment variables set; the pool stays disabled");
        }
        Ok((load_config_from_env()?, ConfigSource::Environment))
    }
}

/// Create a default configuration for examples/testing
#[must_use]
pub fn create_default_config() -> Config {
    Config {
        pool: PoolSettings {
            enable: true,
            trackers: TrackerList::List(vec!["192.168.1.100:22122".to_string()]),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = create_default_config();
        let pool = config.pool.to_pool_config().unwrap();
        assert_eq!(pool.trackers()[0].to_string(), "192.168.1.100:22122");
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = create_default_config();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_source_description() {
        assert_eq!(ConfigSource::File.description(), "configuration file");
    }
}
