//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use crate::constants::{heartbeat, pool};
use std::time::Duration;

#[inline]
pub fn min_pool_size() -> usize {
    pool::DEFAULT_MIN_POOL_SIZE
}

#[inline]
pub fn max_pool_size() -> usize {
    pool::DEFAULT_MAX_POOL_SIZE
}

/// Default checkout wait (200 seconds)
#[inline]
pub fn wait_timeout() -> Duration {
    Duration::from_secs(pool::DEFAULT_WAIT_TIMEOUT_SECS)
}

#[inline]
pub fn connect_timeout() -> Duration {
    Duration::from_secs(pool::DEFAULT_CONNECT_TIMEOUT_SECS)
}

#[inline]
pub fn network_timeout() -> Duration {
    Duration::from_secs(pool::DEFAULT_NETWORK_TIMEOUT_SECS)
}

#[inline]
pub fn connect_attempts() -> u32 {
    pool::DEFAULT_CONNECT_ATTEMPTS
}

#[inline]
pub fn retry_backoff() -> Duration {
    Duration::from_millis(pool::DEFAULT_RETRY_BACKOFF_MS)
}

#[inline]
pub fn charset() -> String {
    pool::DEFAULT_CHARSET.to_string()
}

/// Default heartbeat interval (one hour)
#[inline]
pub fn heartbeat_interval() -> Duration {
    Duration::from_secs(heartbeat::DEFAULT_INTERVAL_SECS)
}

#[inline]
pub fn heartbeat_poll_timeout() -> Duration {
    Duration::from_millis(heartbeat::DEFAULT_POLL_TIMEOUT_MS)
}
