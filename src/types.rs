//! Core types for request correlation and session identification

pub mod duration;
pub mod pool;
pub mod tracker;

pub use duration::{duration_serde, millis_serde};
pub use pool::{IdleSessions, MaxPoolSize, OutstandingSessions, PoolStatus};
pub use tracker::{TrackerAddr, parse_tracker_list};

use derive_more::{Display, From};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Opaque correlation token for one pool call
///
/// Only used to tie log lines together; never for routing or deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new random request ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-unique identifier of a tracker session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("session-{_0}")]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next identifier
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
        assert_ne!(RequestId::default(), RequestId::default());
    }

    #[test]
    fn test_request_id_is_v4() {
        let id = RequestId::new();
        assert_eq!(id.as_uuid().get_version(), Some(uuid::Version::Random));
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn test_session_ids_increase() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert!(b > a);
        assert_eq!(format!("{}", a), format!("session-{}", a.get()));
    }
}
