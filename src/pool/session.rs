//! A single live connection to a tracker node

use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::debug;

use super::health_check::{check_active_test, check_tcp_alive};
use crate::connection_error::ConnectionError;
use crate::constants::pool::QUIT_TIMEOUT;
use crate::protocol::send_quit;
use crate::types::{SessionId, TrackerAddr};

/// One established, reusable connection to a tracker node
///
/// Owned by exactly one holder at a time: the idle registry, the caller that
/// checked it out, or the heartbeat while probing. Sessions are only created
/// by the pool's factory.
#[derive(Debug)]
pub struct TrackerSession {
    id: SessionId,
    tracker: TrackerAddr,
    stream: TcpStream,
    created_at: Instant,
    alive: bool,
}

impl TrackerSession {
    pub(crate) fn new(tracker: TrackerAddr, stream: TcpStream) -> Self {
        Self {
            id: SessionId::next(),
            tracker,
            stream,
            created_at: Instant::now(),
            alive: true,
        }
    }

    #[must_use]
    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The tracker endpoint this session is bound to
    #[must_use]
    #[inline]
    pub fn tracker(&self) -> &TrackerAddr {
        &self.tracker
    }

    #[must_use]
    #[inline]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// False once a probe failed or the holder reported it broken
    #[must_use]
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Record that the session is unusable; the pool will drop it on checkin
    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// The underlying stream, for the storage client's protocol exchanges
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Liveness probe: TCP-level peek, then an ACTIVE_TEST round trip
    ///
    /// A failed probe marks the session dead.
    pub async fn probe(&mut self, timeout: Duration) -> Result<(), ConnectionError> {
        let result = match check_tcp_alive(&self.stream) {
            Ok(()) => check_active_test(&mut self.stream, timeout).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.alive = false;
        }
        result
    }

    /// Close the session
    ///
    /// A live session gets a best-effort QUIT on a detached task so the
    /// caller never waits on network I/O; the socket closes when that task
    /// finishes. Outside a tokio runtime the socket is closed immediately.
    pub fn close(mut self) {
        let was_alive = std::mem::replace(&mut self.alive, false);
        if !was_alive {
            debug!(session = %self.id, tracker = %self.tracker, "Closing dead session");
            return;
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                match tokio::time::timeout(QUIT_TIMEOUT, send_quit(&mut self.stream)).await {
                    Ok(Ok(())) => debug!(session = %self.id, "Sent QUIT to tracker"),
                    Ok(Err(e)) => debug!(session = %self.id, error = %e, "Failed to send QUIT"),
                    Err(_) => debug!(session = %self.id, "Timed out sending QUIT"),
                }
            });
        }
    }
}
