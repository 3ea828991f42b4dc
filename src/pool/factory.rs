//! Tracker session factory
//!
//! Opens TCP connections to tracker nodes in round-robin order, tunes the
//! socket, verifies the tracker answers ACTIVE_TEST and retries with a short
//! jittered backoff until the attempt budget is spent.

use socket2::{SockRef, TcpKeepalive};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{Level, debug, error, info, warn};

use super::idle::IdleRegistry;
use super::session::TrackerSession;
use crate::config::PoolConfig;
use crate::connection_error::{ConnectionError, PoolError};
use crate::constants::socket::{KEEPALIVE_INTERVAL, KEEPALIVE_TIME};
use crate::types::{RequestId, SessionId, TrackerAddr};

/// Creates tracker sessions on demand
#[derive(Debug)]
pub struct ConnectionFactory {
    trackers: Vec<TrackerAddr>,
    cursor: AtomicUsize,
    connect_timeout: Duration,
    network_timeout: Duration,
    attempts: u32,
    backoff: Duration,
}

impl ConnectionFactory {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            trackers: config.trackers().to_vec(),
            cursor: AtomicUsize::new(0),
            connect_timeout: config.connect_timeout(),
            network_timeout: config.network_timeout(),
            attempts: config.connect_attempts(),
            backoff: config.retry_backoff(),
        }
    }

    /// Next tracker in round-robin order
    fn next_tracker(&self) -> &TrackerAddr {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.trackers.len();
        &self.trackers[index]
    }

    /// Open a session, retrying up to the configured attempt budget
    ///
    /// Each attempt moves on to the next tracker. On exhaustion the last
    /// attempt's error is returned inside [`PoolError::ConnectFailed`].
    pub async fn open(&self, request_id: RequestId) -> Result<TrackerSession, PoolError> {
        let mut attempt = 1;

        loop {
            let tracker = self.next_tracker();
            let err = match self.try_open(tracker).await {
                Ok(session) => {
                    debug!(
                        request_id = %request_id,
                        session = %session.id(),
                        tracker = %tracker,
                        attempt,
                        "Opened tracker session"
                    );
                    return Ok(session);
                }
                Err(e) => e,
            };

            let level = err.log_level();
            if level == Level::ERROR {
                error!(request_id = %request_id, tracker = %tracker, attempt, max_attempts = self.attempts, error = %err, "Tracker connect attempt failed");
            } else if level == Level::DEBUG {
                debug!(request_id = %request_id, tracker = %tracker, attempt, max_attempts = self.attempts, error = %err, "Tracker connect attempt failed");
            } else {
                warn!(request_id = %request_id, tracker = %tracker, attempt, max_attempts = self.attempts, error = %err, "Tracker connect attempt failed");
            }

            if attempt >= self.attempts {
                return Err(PoolError::ConnectFailed {
                    attempts: self.attempts,
                    last: err,
                });
            }
            attempt += 1;

            if !self.backoff.is_zero() {
                // Up to 25% jitter so simultaneous growers don't hit the tracker in lockstep
                let jitter_cap = (self.backoff.as_millis() as u64 / 4).max(1);
                let jitter = Duration::from_millis(rand::random::<u64>() % jitter_cap);
                tokio::time::sleep(self.backoff + jitter).await;
            }
        }
    }

    /// Open a session and make it available for checkout
    ///
    /// The outstanding counter is incremented before the session becomes
    /// visible in the registry, so a concurrent checkin or discard can never
    /// observe it at zero for a session that exists.
    pub async fn create_into(
        &self,
        idle: &IdleRegistry,
        outstanding: &AtomicUsize,
        request_id: RequestId,
    ) -> Result<SessionId, PoolError> {
        let session = self.open(request_id).await?;
        let id = session.id();
        let total = outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        idle.push(session);
        info!(request_id = %request_id, session = %id, outstanding = total, "Added tracker session to pool");
        Ok(id)
    }

    /// One attempt: resolve, connect, tune, probe
    async fn try_open(&self, tracker: &TrackerAddr) -> Result<TrackerSession, ConnectionError> {
        let stream = self.connect(tracker).await?;
        configure_socket(&stream)?;

        let mut session = TrackerSession::new(tracker.clone(), stream);
        session.probe(self.network_timeout).await?;
        Ok(session)
    }

    async fn connect(&self, tracker: &TrackerAddr) -> Result<TcpStream, ConnectionError> {
        let address = tracker.to_string();
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((tracker.host(), tracker.port()))
            .await
            .map_err(|source| ConnectionError::DnsResolution {
                address: address.clone(),
                source,
            })?
            .collect();

        // Try each resolved address, keeping the last failure
        let mut last_err = ConnectionError::DnsResolution {
            address: address.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
        };
        for addr in addrs {
            match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => return Ok(stream),
                Ok(Err(source)) => {
                    last_err = ConnectionError::TcpConnect {
                        address: address.clone(),
                        source,
                    }
                }
                Err(_) => {
                    last_err = ConnectionError::ConnectTimeout {
                        address: address.clone(),
                        timeout: self.connect_timeout,
                    }
                }
            }
        }
        Err(last_err)
    }
}

/// Keepalive and nodelay for long-lived idle sessions
fn configure_socket(stream: &TcpStream) -> Result<(), ConnectionError> {
    stream
        .set_nodelay(true)
        .map_err(|source| ConnectionError::SocketConfig {
            operation: "set_nodelay",
            source,
        })?;

    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_TIME)
        .with_interval(KEEPALIVE_INTERVAL);
    SockRef::from(stream)
        .set_tcp_keepalive(&keepalive)
        .map_err(|source| ConnectionError::SocketConfig {
            operation: "set_tcp_keepalive",
            source,
        })
}
