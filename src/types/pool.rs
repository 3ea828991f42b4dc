//! Connection pool metric newtypes
//!
//! Type-safe wrappers for pool statistics so idle and outstanding counts
//! cannot be mixed up.

use derive_more::{Display, From, Into};

/// Number of idle sessions waiting in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
pub struct IdleSessions(usize);

impl IdleSessions {
    #[inline]
    pub const fn new(count: usize) -> Self {
        Self(count)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Number of sessions tracked by the pool, idle or checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
pub struct OutstandingSessions(usize);

impl OutstandingSessions {
    #[inline]
    pub const fn new(count: usize) -> Self {
        Self(count)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Configured soft ceiling on outstanding sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
pub struct MaxPoolSize(usize);

impl MaxPoolSize {
    #[inline]
    pub const fn new(size: usize) -> Self {
        Self(size)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Point-in-time view of a pool
///
/// `checked_out` is derived, so it is only exact when no operation is
/// mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub idle: IdleSessions,
    pub outstanding: OutstandingSessions,
    pub min_size: usize,
    pub max_size: MaxPoolSize,
}

impl PoolStatus {
    /// Sessions currently held by callers
    #[inline]
    #[must_use]
    pub fn checked_out(&self) -> usize {
        self.outstanding.get().saturating_sub(self.idle.get())
    }

    /// Whether the next empty-registry checkout may grow the pool
    #[inline]
    #[must_use]
    pub fn can_grow(&self) -> bool {
        self.outstanding.get() < self.max_size.get()
    }

    /// Utilization of the ceiling as a percentage
    #[must_use]
    pub fn utilization(&self) -> f64 {
        let max = self.max_size.get();
        if max == 0 {
            return 0.0;
        }
        (self.checked_out() as f64 / max as f64) * 100.0
    }
}

impl std::fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "idle={} outstanding={} checked_out={} min={} max={}",
            self.idle,
            self.outstanding,
            self.checked_out(),
            self.min_size,
            self.max_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(idle: usize, outstanding: usize, max: usize) -> PoolStatus {
        PoolStatus {
            idle: IdleSessions::new(idle),
            outstanding: OutstandingSessions::new(outstanding),
            min_size: 1,
            max_size: MaxPoolSize::new(max),
        }
    }

    #[test]
    fn test_newtype_accessors() {
        assert_eq!(IdleSessions::new(5).get(), 5);
        assert_eq!(IdleSessions::zero().get(), 0);
        assert_eq!(OutstandingSessions::from(7).get(), 7);
        assert_eq!(format!("{}", MaxPoolSize::new(30)), "30");
    }

    #[test]
    fn test_checked_out_derivation() {
        assert_eq!(status(2, 5, 10).checked_out(), 3);
        // Transient growth window: registry briefly ahead of the counter
        assert_eq!(status(3, 2, 10).checked_out(), 0);
    }

    #[test]
    fn test_can_grow() {
        assert!(status(0, 9, 10).can_grow());
        assert!(!status(0, 10, 10).can_grow());
    }

    #[test]
    fn test_utilization() {
        assert_eq!(status(0, 5, 10).utilization(), 50.0);
        assert_eq!(status(0, 0, 0).utilization(), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            status(1, 3, 4).to_string(),
            "idle=1 outstanding=3 checked_out=2 min=1 max=4"
        );
    }
}
