//! Error types for the tracker pool
//!
//! Three layers:
//! - [`ConfigError`]: malformed configuration, fatal at construction
//! - [`ConnectionError`]: why a single attempt to open or probe a session failed
//! - [`PoolError`]: what a checkout caller sees

use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Invalid pool configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("tracker list is empty")]
    EmptyTrackerList,

    #[error("invalid tracker address '{entry}': {reason}")]
    InvalidTrackerAddress { entry: String, reason: &'static str },

    #[error("invalid pool size: min {min} / max {max}")]
    InvalidPoolSize { min: usize, max: usize },

    #[error("connect_attempts must be at least 1")]
    ZeroConnectAttempts,

    #[error("unsupported charset '{0}'")]
    UnsupportedCharset(String),
}

/// Failure of one attempt to open or probe a tracker session
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// DNS resolution failed or yielded nothing
    #[error("failed to resolve {address}: {source}")]
    DnsResolution {
        address: String,
        source: std::io::Error,
    },

    /// TCP connect was refused or failed
    #[error("failed to connect to {address}: {source}")]
    TcpConnect {
        address: String,
        source: std::io::Error,
    },

    /// TCP connect did not finish in time
    #[error("connect to {address} timed out after {timeout:?}")]
    ConnectTimeout { address: String, timeout: Duration },

    /// Socket option could not be applied
    #[error("failed to configure socket ({operation}): {source}")]
    SocketConfig {
        operation: &'static str,
        source: std::io::Error,
    },

    /// I/O error while talking to the tracker
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The probe exchange did not complete in time
    #[error("probe timed out after {0:?}")]
    ProbeTimeout(Duration),

    /// The tracker answered with an unexpected header
    #[error("unexpected response header: cmd {cmd}, status {status}, body length {body_len}")]
    UnexpectedResponse { cmd: u8, status: u8, body_len: i64 },

    /// The session is known to be unusable before any exchange
    #[error("probe failed: {0}")]
    ProbeFailed(&'static str),
}

impl ConnectionError {
    /// Check if this is a network connectivity error (tracker unreachable)
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::TcpConnect { .. } | Self::DnsResolution { .. } | Self::ConnectTimeout { .. }
        )
    }

    /// Get the appropriate log level for this error
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        match self {
            Self::Io(e) if is_connection_error(e) => tracing::Level::DEBUG,
            Self::SocketConfig { .. } => tracing::Level::ERROR,
            _ => tracing::Level::WARN,
        }
    }
}

/// Error surfaced by pool operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Configuration was rejected; the pool was never built
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The factory exhausted its attempt budget
    #[error("failed to create tracker session after {attempts} attempt(s): {last}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        last: ConnectionError,
    },

    /// No idle session became available in time
    #[error("timed out after {waited:?} waiting for an idle tracker session")]
    CheckoutTimeout { waited: Duration },

    /// The pool has been shut down
    #[error("tracker pool is shut down")]
    Closed,
}

impl PoolError {
    /// Whether the caller may reasonably try the same call again later
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectFailed { .. } | Self::CheckoutTimeout { .. }
        )
    }

    /// Check if this is a checkout timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::CheckoutTimeout { .. })
    }
}

/// Whether an I/O error means the session's socket is gone
///
/// Broken pipes, resets, aborts and premature EOF all make the session
/// unusable; it must be dropped rather than checked back in.
#[inline]
#[must_use]
pub fn is_connection_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof
            | ErrorKind::NotConnected
            | ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidTrackerAddress {
            entry: "tracker".to_string(),
            reason: "missing port",
        };
        assert_eq!(
            err.to_string(),
            "invalid tracker address 'tracker': missing port"
        );
        assert_eq!(ConfigError::EmptyTrackerList.to_string(), "tracker list is empty");
    }

    #[test]
    fn test_pool_error_from_config_error() {
        let err: PoolError = ConfigError::ZeroConnectAttempts.into();
        assert!(matches!(err, PoolError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        let timeout = PoolError::CheckoutTimeout {
            waited: Duration::from_secs(1),
        };
        assert!(timeout.is_retryable());
        assert!(timeout.is_timeout());

        let connect = PoolError::ConnectFailed {
            attempts: 5,
            last: ConnectionError::ProbeFailed("connection closed"),
        };
        assert!(connect.is_retryable());
        assert!(!connect.is_timeout());

        assert!(!PoolError::Closed.is_retryable());
    }

    #[test]
    fn test_connect_failed_keeps_source() {
        use std::error::Error;

        let err = PoolError::ConnectFailed {
            attempts: 3,
            last: ConnectionError::ProbeTimeout(Duration::from_secs(2)),
        };
        assert!(err.to_string().contains("3 attempt(s)"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_network_error_classification() {
        let refused = ConnectionError::TcpConnect {
            address: "127.0.0.1:22122".to_string(),
            source: std::io::Error::from(ErrorKind::ConnectionRefused),
        };
        assert!(refused.is_network_error());
        assert!(!ConnectionError::ProbeTimeout(Duration::from_secs(1)).is_network_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(is_connection_error(&std::io::Error::from(
            ErrorKind::BrokenPipe
        )));
        assert!(is_connection_error(&std::io::Error::from(
            ErrorKind::UnexpectedEof
        )));
        assert!(!is_connection_error(&std::io::Error::from(
            ErrorKind::InvalidData
        )));
    }

    #[test]
    fn test_log_levels() {
        let eof = ConnectionError::Io(std::io::Error::from(ErrorKind::UnexpectedEof));
        assert_eq!(eof.log_level(), tracing::Level::DEBUG);

        let socket = ConnectionError::SocketConfig {
            operation: "keepalive",
            source: std::io::Error::other("nope"),
        };
        assert_eq!(socket.log_level(), tracing::Level::ERROR);
    }
}
