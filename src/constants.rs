//! Constants used throughout the tracker pool
//!
//! This module centralizes magic numbers, protocol bytes and default
//! configuration values.

use std::time::Duration;

/// FastDFS packet framing constants
///
/// Only the fixed-size header is needed for the liveness probe and the
/// farewell QUIT packet.
pub mod protocol {
    /// Bytes used to encode the body length (big-endian `i64`)
    pub const PKG_LEN_SIZE: usize = 8;

    /// Total header size: length + command byte + status byte
    pub const HEADER_SIZE: usize = PKG_LEN_SIZE + 2;

    /// Command byte of a tracker/storage response
    pub const CMD_RESP: u8 = 100;

    /// Command byte of the no-op liveness exchange
    pub const CMD_ACTIVE_TEST: u8 = 111;

    /// Command byte telling the server we are going away
    pub const CMD_QUIT: u8 = 82;

    /// Status byte for success
    pub const STATUS_OK: u8 = 0;
}

/// Socket tuning for tracker connections
pub mod socket {
    use super::Duration;

    /// Idle time before the kernel starts sending keepalive probes
    pub const KEEPALIVE_TIME: Duration = Duration::from_secs(60);

    /// Interval between kernel keepalive probes
    pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

    /// Buffer size for the non-blocking peek in the TCP-level check
    pub const TCP_PEEK_BUFFER_SIZE: usize = 1;
}

/// Connection pool defaults
pub mod pool {
    use super::Duration;

    /// Default number of idle sessions kept around at checkin time
    pub const DEFAULT_MIN_POOL_SIZE: usize = 10;

    /// Default soft ceiling on outstanding sessions
    pub const DEFAULT_MAX_POOL_SIZE: usize = 30;

    /// Default time a checkout waits for an idle session (seconds)
    pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 200;

    /// Default TCP connect timeout (seconds)
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

    /// Default bound on any single probe exchange (seconds)
    pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 30;

    /// Default number of attempts the factory makes (first try plus retries)
    pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

    /// Default fixed delay between factory attempts (milliseconds)
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

    /// Default charset for protocol strings
    pub const DEFAULT_CHARSET: &str = "UTF-8";

    /// How long a closing session may spend sending QUIT
    pub const QUIT_TIMEOUT: Duration = Duration::from_millis(500);
}

/// Heartbeat sweeper defaults
pub mod heartbeat {
    /// Default interval between sweeps (one hour)
    pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

    /// Default bounded wait when popping an idle session during a sweep (milliseconds)
    /// Short so a busy pool ends the sweep early instead of stalling it
    pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 200;

    /// Sweeps more frequent than this mostly generate probe traffic
    pub const MIN_RECOMMENDED_INTERVAL_SECS: u64 = 30;

    /// Sweeps rarer than this let dead sessions linger for a long time
    pub const MAX_RECOMMENDED_INTERVAL_SECS: u64 = 6 * 3600;
}
