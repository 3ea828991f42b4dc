//! Health check implementation for pooled tracker sessions
//!
//! This module provides:
//! - TCP-level checks using a non-blocking read
//! - Application-level checks using the ACTIVE_TEST exchange
//! - Sweep metrics tracking

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::connection_error::ConnectionError;
use crate::constants::socket::TCP_PEEK_BUFFER_SIZE;
use crate::protocol::active_test;

/// Fast TCP-level check for obviously dead connections
///
/// - `Ok(0)` from `try_read` means the peer closed the connection
/// - `Ok(n)` means unsolicited bytes are waiting, so framing is out of sync
/// - `WouldBlock` is the expected case for a healthy idle session
/// - any other error is a socket-level failure
pub fn check_tcp_alive(stream: &TcpStream) -> Result<(), ConnectionError> {
    let mut peek_buf = [0u8; TCP_PEEK_BUFFER_SIZE];

    match stream.try_read(&mut peek_buf) {
        Ok(0) => Err(ConnectionError::ProbeFailed("connection closed by tracker")),
        Ok(_) => Err(ConnectionError::ProbeFailed("unexpected data on idle session")),
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
        Err(e) => Err(ConnectionError::Io(e)),
    }
}

/// Application-level check: one ACTIVE_TEST round trip within `limit`
pub async fn check_active_test(stream: &mut TcpStream, limit: Duration) -> Result<(), ConnectionError> {
    timeout(limit, active_test(stream))
        .await
        .map_err(|_| ConnectionError::ProbeTimeout(limit))?
}

/// Outcome of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Idle sessions seen at sweep start
    pub snapshot: usize,
    /// Sessions actually popped and probed
    pub checked: usize,
    /// Sessions that failed the probe and were dropped
    pub failed: usize,
}

impl SweepReport {
    /// Whether the sweep ran out of idle sessions before its snapshot count
    #[must_use]
    pub fn ended_early(&self) -> bool {
        self.checked < self.snapshot
    }
}

/// Metrics for periodic sweeps (lock-free)
#[derive(Debug, Default)]
pub struct SweepMetrics {
    cycles_run: AtomicU64,
    sessions_checked: AtomicU64,
    sessions_failed: AtomicU64,
}

impl SweepMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sweep
    pub fn record_cycle(&self, report: &SweepReport) {
        self.cycles_run.fetch_add(1, Ordering::Relaxed);
        self.sessions_checked
            .fetch_add(report.checked as u64, Ordering::Relaxed);
        self.sessions_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run.load(Ordering::Relaxed)
    }

    pub fn sessions_checked(&self) -> u64 {
        self.sessions_checked.load(Ordering::Relaxed)
    }

    pub fn sessions_failed(&self) -> u64 {
        self.sessions_failed.load(Ordering::Relaxed)
    }

    /// Get the failure rate (0.0 to 1.0)
    pub fn failure_rate(&self) -> f64 {
        let checked = self.sessions_checked();
        if checked == 0 {
            0.0
        } else {
            self.sessions_failed() as f64 / checked as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_empty() {
        let metrics = SweepMetrics::new();
        assert_eq!(metrics.cycles_run(), 0);
        assert_eq!(metrics.failure_rate(), 0.0);
    }

    #[test]
    fn test_metrics_accumulate() {
        let metrics = SweepMetrics::new();
        metrics.record_cycle(&SweepReport {
            snapshot: 4,
            checked: 4,
            failed: 1,
        });
        metrics.record_cycle(&SweepReport {
            snapshot: 4,
            checked: 4,
            failed: 1,
        });
        assert_eq!(metrics.cycles_run(), 2);
        assert_eq!(metrics.sessions_checked(), 8);
        assert_eq!(metrics.sessions_failed(), 2);
        assert_eq!(metrics.failure_rate(), 0.25);
    }

    #[test]
    fn test_report_ended_early() {
        let full = SweepReport {
            snapshot: 3,
            checked: 3,
            failed: 0,
        };
        assert!(!full.ended_early());

        let short = SweepReport {
            snapshot: 3,
            checked: 1,
            failed: 0,
        };
        assert!(short.ended_early());
    }
}
