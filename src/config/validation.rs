//! Configuration validation
//!
//! Turns raw settings into a [`PoolConfig`], rejecting anything that would
//! only fail later at call time.

use std::num::NonZeroU32;
use std::time::Duration;

use super::types::{PoolConfig, PoolConfigBuilder, PoolSettings};
use crate::connection_error::ConfigError;
use crate::constants::heartbeat::{MAX_RECOMMENDED_INTERVAL_SECS, MIN_RECOMMENDED_INTERVAL_SECS};
use crate::types::parse_tracker_list;

const MIN_RECOMMENDED_INTERVAL: Duration = Duration::from_secs(MIN_RECOMMENDED_INTERVAL_SECS);
const MAX_RECOMMENDED_INTERVAL: Duration = Duration::from_secs(MAX_RECOMMENDED_INTERVAL_SECS);

/// Charsets whose encoding of protocol strings is byte-compatible with UTF-8
const SUPPORTED_CHARSETS: &[&str] = &["utf-8", "utf8", "us-ascii", "ascii"];

impl PoolConfigBuilder {
    /// Validate and build the [`PoolConfig`]
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyTrackerList`] when no tracker entries are given
    /// - [`ConfigError::InvalidTrackerAddress`] for any malformed entry
    /// - [`ConfigError::InvalidPoolSize`] when `max == 0` or `min > max`
    /// - [`ConfigError::ZeroConnectAttempts`] when attempts is 0
    /// - [`ConfigError::UnsupportedCharset`] for non UTF-8 compatible charsets
    pub fn build(self) -> Result<PoolConfig, ConfigError> {
        let trackers = parse_tracker_list(&self.trackers)?;

        if self.max_size == 0 || self.min_size > self.max_size {
            return Err(ConfigError::InvalidPoolSize {
                min: self.min_size,
                max: self.max_size,
            });
        }

        let connect_attempts =
            NonZeroU32::new(self.connect_attempts).ok_or(ConfigError::ZeroConnectAttempts)?;

        let charset = self.charset.trim();
        if !SUPPORTED_CHARSETS
            .iter()
            .any(|c| c.eq_ignore_ascii_case(charset))
        {
            return Err(ConfigError::UnsupportedCharset(self.charset));
        }

        if let Some(interval) = self.heartbeat_interval {
            warn_on_unusual_interval(interval);
        }

        Ok(PoolConfig {
            trackers,
            min_size: self.min_size,
            max_size: self.max_size,
            wait_timeout: self.wait_timeout,
            charset: charset.to_string(),
            connect_timeout: self.connect_timeout,
            network_timeout: self.network_timeout,
            connect_attempts,
            retry_backoff: self.retry_backoff,
            heartbeat_interval: self.heartbeat_interval.filter(|d| !d.is_zero()),
            heartbeat_poll_timeout: self.heartbeat_poll_timeout,
        })
    }
}

impl PoolSettings {
    /// Validate these settings into a [`PoolConfig`]
    pub fn to_pool_config(&self) -> Result<PoolConfig, ConfigError> {
        let trackers = self
            .trackers
            .entries()
            .into_iter()
            .map(str::to_string)
            .collect();

        PoolConfigBuilder::new(trackers)
            .min_size(self.min_pool_size)
            .max_size(self.max_pool_size)
            .wait_timeout(self.wait_timeout)
            .charset(self.charset.clone())
            .connect_timeout(self.connect_timeout)
            .network_timeout(self.network_timeout)
            .connect_attempts(self.connect_attempts)
            .retry_backoff(self.retry_backoff)
            .heartbeat_interval(Some(self.heartbeat_interval))
            .heartbeat_poll_timeout(self.heartbeat_poll_timeout)
            .build()
    }
}

/// Warn if the sweep interval is outside the recommended range
fn warn_on_unusual_interval(interval: Duration) {
    if interval.is_zero() {
        return;
    }
    if interval < MIN_RECOMMENDED_INTERVAL {
        tracing::warn!(
            "heartbeat_interval {:?} is below {:?}; this mostly generates probe traffic",
            interval,
            MIN_RECOMMENDED_INTERVAL
        );
    } else if interval > MAX_RECOMMENDED_INTERVAL {
        tracing::warn!(
            "heartbeat_interval {:?} is above {:?}; dead sessions may linger",
            interval,
            MAX_RECOMMENDED_INTERVAL
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::TrackerList;

    #[test]
    fn test_builder_defaults() {
        let config = PoolConfig::builder(["127.0.0.1:22122"]).build().unwrap();
        assert_eq!(config.min_size(), 10);
        assert_eq!(config.max_size(), 30);
        assert_eq!(config.wait_timeout(), Duration::from_secs(200));
        assert_eq!(config.connect_attempts(), 5);
        assert_eq!(config.charset(), "UTF-8");
        assert_eq!(config.heartbeat_interval(), Some(Duration::from_secs(3600)));
        assert_eq!(config.trackers().len(), 1);
    }

    #[test]
    fn test_empty_tracker_list() {
        let err = PoolConfig::builder(Vec::<String>::new()).build().unwrap_err();
        assert_eq!(err, ConfigError::EmptyTrackerList);
    }

    #[test]
    fn test_malformed_tracker() {
        let err = PoolConfig::builder(["t1:22122", "t2"]).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTrackerAddress { .. }));
    }

    #[test]
    fn test_min_greater_than_max() {
        let err = PoolConfig::builder(["t1:22122"])
            .min_size(5)
            .max_size(4)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPoolSize { min: 5, max: 4 });
    }

    #[test]
    fn test_zero_max() {
        assert!(
            PoolConfig::builder(["t1:22122"])
                .min_size(0)
                .max_size(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_min_zero_allowed() {
        let config = PoolConfig::builder(["t1:22122"])
            .min_size(0)
            .max_size(1)
            .build()
            .unwrap();
        assert_eq!(config.min_size(), 0);
    }

    #[test]
    fn test_zero_attempts() {
        let err = PoolConfig::builder(["t1:22122"])
            .connect_attempts(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroConnectAttempts);
    }

    #[test]
    fn test_charset() {
        assert!(
            PoolConfig::builder(["t1:22122"])
                .charset("utf8")
                .build()
                .is_ok()
        );
        assert!(matches!(
            PoolConfig::builder(["t1:22122"]).charset("GBK").build(),
            Err(ConfigError::UnsupportedCharset(_))
        ));
    }

    #[test]
    fn test_zero_heartbeat_disables() {
        let config = PoolConfig::builder(["t1:22122"])
            .heartbeat_interval(Some(Duration::ZERO))
            .build()
            .unwrap();
        assert_eq!(config.heartbeat_interval(), None);
    }

    #[test]
    fn test_settings_to_pool_config() {
        let settings = PoolSettings {
            trackers: TrackerList::Joined("t1:22122,t2:22123".to_string()),
            min_pool_size: 1,
            max_pool_size: 2,
            ..Default::default()
        };
        let config = settings.to_pool_config().unwrap();
        assert_eq!(config.trackers().len(), 2);
        assert_eq!(config.trackers()[1].port(), 22123);
        assert_eq!(config.max_size(), 2);
    }

    #[test]
    fn test_default_settings_rejected() {
        // No trackers configured
        assert_eq!(
            PoolSettings::default().to_pool_config().unwrap_err(),
            ConfigError::EmptyTrackerList
        );
    }
}
