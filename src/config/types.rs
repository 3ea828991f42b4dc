//! Configuration type definitions
//!
//! [`Config`] / [`PoolSettings`] mirror the TOML file; [`PoolConfig`] is the
//! validated, immutable form the pool is built from.

use crate::types::{TrackerAddr, duration_serde, millis_serde};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

/// Top-level configuration file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Tracker pool settings
    #[serde(default)]
    pub pool: PoolSettings,
}

/// Tracker endpoints as written in the file
///
/// Accepts either a list (`["a:22122", "b:22122"]`) or a single
/// comma-joined string (`"a:22122,b:22122"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackerList {
    Joined(String),
    List(Vec<String>),
}

impl TrackerList {
    /// Iterate the raw entries (each may still contain commas)
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Joined(s) => vec![s.as_str()],
            Self::List(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for TrackerList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Raw pool settings as they appear in the `[pool]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolSettings {
    /// Whether the pool should be started at all
    pub enable: bool,
    /// Tracker endpoints (`host:port`)
    pub trackers: TrackerList,
    /// Idle sessions kept at checkin time
    pub min_pool_size: usize,
    /// Soft ceiling on outstanding sessions
    pub max_pool_size: usize,
    /// Checkout wait, in seconds
    #[serde(with = "duration_serde")]
    pub wait_timeout: Duration,
    /// Character encoding for protocol strings
    pub charset: String,
    /// TCP connect timeout, in seconds
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
    /// Bound on each probe exchange, in seconds
    #[serde(with = "duration_serde")]
    pub network_timeout: Duration,
    /// Factory attempts per creation (first try included)
    pub connect_attempts: u32,
    /// Fixed delay between factory attempts, in milliseconds
    #[serde(with = "millis_serde")]
    pub retry_backoff: Duration,
    /// Heartbeat interval in seconds (0 disables the sweeper)
    #[serde(with = "duration_serde")]
    pub heartbeat_interval: Duration,
    /// Bounded wait per idle-session pop during a sweep, in milliseconds
    #[serde(with = "millis_serde")]
    pub heartbeat_poll_timeout: Duration,
    /// Base URL under which stored files are served (used by the file façade)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_proxy_server: Option<String>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            enable: false,
            trackers: TrackerList::default(),
            min_pool_size: super::defaults::min_pool_size(),
            max_pool_size: super::defaults::max_pool_size(),
            wait_timeout: super::defaults::wait_timeout(),
            charset: super::defaults::charset(),
            connect_timeout: super::defaults::connect_timeout(),
            network_timeout: super::defaults::network_timeout(),
            connect_attempts: super::defaults::connect_attempts(),
            retry_backoff: super::defaults::retry_backoff(),
            heartbeat_interval: super::defaults::heartbeat_interval(),
            heartbeat_poll_timeout: super::defaults::heartbeat_poll_timeout(),
            file_proxy_server: None,
        }
    }
}

/// Validated, immutable pool configuration
///
/// Only obtainable through [`PoolConfig::builder`] or
/// [`PoolSettings::to_pool_config`], both of which reject malformed
/// tracker lists and sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub(crate) trackers: Vec<TrackerAddr>,
    pub(crate) min_size: usize,
    pub(crate) max_size: usize,
    pub(crate) wait_timeout: Duration,
    pub(crate) charset: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) network_timeout: Duration,
    pub(crate) connect_attempts: NonZeroU32,
    pub(crate) retry_backoff: Duration,
    pub(crate) heartbeat_interval: Option<Duration>,
    pub(crate) heartbeat_poll_timeout: Duration,
}

impl PoolConfig {
    /// Create a builder for the given tracker entries
    ///
    /// # Examples
    ///
    /// ```
    /// use fdfs_pool::config::PoolConfig;
    /// use std::time::Duration;
    ///
    /// let config = PoolConfig::builder(["192.168.1.100:22122"])
    ///     .min_size(2)
    ///     .max_size(8)
    ///     .wait_timeout(Duration::from_secs(5))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.max_size(), 8);
    ///
    /// assert!(PoolConfig::builder(["no-port"]).build().is_err());
    /// ```
    #[must_use]
    pub fn builder<I, S>(trackers: I) -> PoolConfigBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PoolConfigBuilder::new(trackers.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn trackers(&self) -> &[TrackerAddr] {
        &self.trackers
    }

    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn network_timeout(&self) -> Duration {
        self.network_timeout
    }

    #[must_use]
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts.get()
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Sweep interval, or `None` when the heartbeat is disabled
    #[must_use]
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval
    }

    #[must_use]
    pub fn heartbeat_poll_timeout(&self) -> Duration {
        self.heartbeat_poll_timeout
    }
}

/// Builder for [`PoolConfig`]
///
/// Unset values fall back to the same defaults as the config file.
#[derive(Debug, Clone)]
pub struct PoolConfigBuilder {
    pub(super) trackers: Vec<String>,
    pub(super) min_size: usize,
    pub(super) max_size: usize,
    pub(super) wait_timeout: Duration,
    pub(super) charset: String,
    pub(super) connect_timeout: Duration,
    pub(super) network_timeout: Duration,
    pub(super) connect_attempts: u32,
    pub(super) retry_backoff: Duration,
    pub(super) heartbeat_interval: Option<Duration>,
    pub(super) heartbeat_poll_timeout: Duration,
}

impl PoolConfigBuilder {
    #[must_use]
    pub fn new(trackers: Vec<String>) -> Self {
        Self {
            trackers,
            min_size: super::defaults::min_pool_size(),
            max_size: super::defaults::max_pool_size(),
            wait_timeout: super::defaults::wait_timeout(),
            charset: super::defaults::charset(),
            connect_timeout: super::defaults::connect_timeout(),
            network_timeout: super::defaults::network_timeout(),
            connect_attempts: super::defaults::connect_attempts(),
            retry_backoff: super::defaults::retry_backoff(),
            heartbeat_interval: Some(super::defaults::heartbeat_interval()),
            heartbeat_poll_timeout: super::defaults::heartbeat_poll_timeout(),
        }
    }

    #[must_use]
    pub fn min_size(mut self, min: usize) -> Self {
        self.min_size = min;
        self
    }

    #[must_use]
    pub fn max_size(mut self, max: usize) -> Self {
        self.max_size = max;
        self
    }

    #[must_use]
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the sweep interval; `None` disables the heartbeat
    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Option<Duration>) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn heartbeat_poll_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_poll_timeout = timeout;
        self
    }
}
