//! The tracker session pool
//!
//! [`TrackerPool`] is a cheap-to-clone handle over shared state. Any number of
//! tasks may check sessions out, check them in and discard them concurrently.
//!
//! Accounting: `outstanding` counts every session the pool is responsible
//! for, idle or checked out. It grows when the factory creates a session and
//! shrinks when one is discarded, never below zero. `max_size` is a soft
//! ceiling: concurrent growers that all observe `outstanding < max` may each
//! create a session.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::connection_guard::PooledSession;
use super::factory::ConnectionFactory;
use super::health_check::SweepMetrics;
use super::heartbeat::Heartbeat;
use super::idle::IdleRegistry;
use super::session::TrackerSession;
use crate::config::{PoolConfig, PoolSettings};
use crate::connection_error::PoolError;
use crate::types::{IdleSessions, MaxPoolSize, OutstandingSessions, PoolStatus, RequestId};

#[derive(Debug)]
struct PoolInner {
    config: PoolConfig,
    idle: IdleRegistry,
    outstanding: AtomicUsize,
    factory: ConnectionFactory,
    closed: AtomicBool,
    heartbeat: Mutex<Option<Heartbeat>>,
    sweep_metrics: Arc<SweepMetrics>,
}

/// Shared pool of reusable tracker sessions
#[derive(Debug, Clone)]
pub struct TrackerPool {
    inner: Arc<PoolInner>,
}

/// Non-owning handle used by the heartbeat so it never keeps the pool alive
#[derive(Debug, Clone)]
pub(crate) struct WeakTrackerPool(Weak<PoolInner>);

impl WeakTrackerPool {
    pub(crate) fn upgrade(&self) -> Option<TrackerPool> {
        self.0.upgrade().map(|inner| TrackerPool { inner })
    }
}

impl TrackerPool {
    /// Build an empty pool; no connections are opened
    ///
    /// Use [`TrackerPool::start`] to also prewarm and launch the heartbeat.
    pub fn new(config: PoolConfig) -> Self {
        let factory = ConnectionFactory::new(&config);
        Self {
            inner: Arc::new(PoolInner {
                config,
                idle: IdleRegistry::new(),
                outstanding: AtomicUsize::new(0),
                factory,
                closed: AtomicBool::new(false),
                heartbeat: Mutex::new(None),
                sweep_metrics: Arc::new(SweepMetrics::new()),
            }),
        }
    }

    /// Validate raw settings and build an empty pool
    pub fn from_settings(settings: &PoolSettings) -> Result<Self, PoolError> {
        Ok(Self::new(settings.to_pool_config()?))
    }

    /// Build, prewarm to `min_size`, and start the heartbeat if configured
    ///
    /// Prewarm failures are logged, not fatal: the pool grows lazily later.
    pub async fn start(config: PoolConfig) -> Self {
        let pool = Self::new(config);
        pool.prewarm().await;
        if let Some(interval) = pool.inner.config.heartbeat_interval() {
            pool.start_heartbeat(interval);
        }
        pool
    }

    /// Open `min_size` sessions concurrently
    ///
    /// Returns how many were created.
    pub async fn prewarm(&self) -> usize {
        let target = self.inner.config.min_size();
        if target == 0 {
            return 0;
        }

        info!(
            "Prewarming tracker pool with {} session(s) across {} tracker(s)",
            target,
            self.inner.config.trackers().len()
        );

        let mut tasks = JoinSet::new();
        for _ in 0..target {
            let pool = self.clone();
            tasks.spawn(async move { pool.grow(RequestId::new()).await });
        }

        let mut created = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => created += 1,
                Ok(Err(e)) => warn!("Prewarm session failed: {}", e),
                Err(e) => error!("Prewarm task panicked: {}", e),
            }
        }

        if created < target {
            warn!("Prewarmed {}/{} tracker sessions", created, target);
        } else {
            info!("Prewarmed {} tracker sessions", created);
        }
        created
    }

    /// Launch the periodic heartbeat, replacing any running one
    pub fn start_heartbeat(&self, interval: Duration) {
        let heartbeat = Heartbeat::spawn(
            self.downgrade(),
            interval,
            self.inner.config.heartbeat_poll_timeout(),
            Arc::clone(&self.inner.sweep_metrics),
        );
        let previous = self
            .inner
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(heartbeat);
        if let Some(previous) = previous {
            previous.signal();
        }
    }

    /// Obtain exclusive use of a session
    ///
    /// 1. Take an idle session if one is immediately available.
    /// 2. Otherwise, if fewer than `max_size` sessions are outstanding, create
    ///    one into the idle registry (it may be taken by a competing caller).
    /// 3. Wait up to `wait_timeout` for an idle session.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ConnectFailed`] if growth was attempted and failed
    /// - [`PoolError::CheckoutTimeout`] if nothing became idle in time
    /// - [`PoolError::Closed`] after [`TrackerPool::shutdown`]
    pub async fn checkout(&self, request_id: RequestId) -> Result<TrackerSession, PoolError> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        if let Some(session) = self.inner.idle.try_pop() {
            debug!(request_id = %request_id, session = %session.id(), "Checked out idle tracker session");
            return Ok(session);
        }

        let outstanding = self.inner.outstanding.load(Ordering::Acquire);
        let max = self.inner.config.max_size();
        if outstanding < max {
            self.grow(request_id).await?;
        } else {
            debug!(
                request_id = %request_id,
                outstanding,
                max,
                "Pool at capacity, waiting for a checkin"
            );
        }

        let wait = self.inner.config.wait_timeout();
        match self.inner.idle.pop_timeout(wait).await {
            Some(session) if self.is_closed() => {
                self.drop_session(session);
                Err(PoolError::Closed)
            }
            Some(session) => {
                debug!(request_id = %request_id, session = %session.id(), "Checked out tracker session");
                Ok(session)
            }
            None if self.is_closed() => Err(PoolError::Closed),
            None => {
                error!(
                    request_id = %request_id,
                    waited = ?wait,
                    outstanding = self.inner.outstanding.load(Ordering::Relaxed),
                    "Timed out waiting for a tracker session"
                );
                Err(PoolError::CheckoutTimeout { waited: wait })
            }
        }
    }

    /// Check out a session wrapped in a guard that returns it on every path
    pub async fn checkout_guarded(&self, request_id: RequestId) -> Result<PooledSession, PoolError> {
        let session = self.checkout(request_id).await?;
        Ok(PooledSession::new(self.clone(), session, request_id))
    }

    /// Return a session after use
    ///
    /// Kept idle while fewer than `min_size` sessions are idle; otherwise
    /// closed and discarded. A session marked dead is always discarded.
    /// `None` is accepted and ignored.
    pub fn checkin(&self, session: impl Into<Option<TrackerSession>>) {
        let Some(session) = session.into() else {
            return;
        };

        if self.is_closed() || !session.is_alive() {
            self.drop_session(session);
            return;
        }

        let idle = self.inner.idle.len();
        if idle < self.inner.config.min_size() {
            debug!(session = %session.id(), idle, "Returned tracker session to idle registry");
            self.inner.idle.push(session);
        } else {
            debug!(session = %session.id(), idle, "Idle registry full, discarding tracker session");
            self.drop_session(session);
        }
    }

    /// Discard a session believed broken
    ///
    /// The session is closed and no longer counted. `None` is accepted and
    /// ignored.
    pub fn drop_session(&self, session: impl Into<Option<TrackerSession>>) {
        let Some(session) = session.into() else {
            return;
        };

        let id = session.id();
        session.close();
        match self.decrement_outstanding() {
            Some(remaining) => debug!(session = %id, outstanding = remaining, "Discarded tracker session"),
            None => warn!(session = %id, "Discarded tracker session while outstanding count was already zero"),
        }
    }

    /// Saturating decrement; `None` when already zero
    fn decrement_outstanding(&self) -> Option<usize> {
        self.inner
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|previous| previous - 1)
    }

    /// Create one session into the idle registry
    ///
    /// A session that lands after shutdown has drained the registry is
    /// closed here, along with anything else left idle.
    async fn grow(&self, request_id: RequestId) -> Result<(), PoolError> {
        self.inner
            .factory
            .create_into(&self.inner.idle, &self.inner.outstanding, request_id)
            .await?;

        if self.is_closed() {
            for session in self.inner.idle.drain() {
                debug!(request_id = %request_id, session = %session.id(), "Closing session created during shutdown");
                self.drop_session(session);
            }
            return Err(PoolError::Closed);
        }
        Ok(())
    }

    /// Point-in-time counts
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            idle: IdleSessions::new(self.inner.idle.len()),
            outstanding: OutstandingSessions::new(self.inner.outstanding.load(Ordering::Acquire)),
            min_size: self.inner.config.min_size(),
            max_size: MaxPoolSize::new(self.inner.config.max_size()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Counters accumulated by heartbeat sweeps
    #[must_use]
    pub fn sweep_metrics(&self) -> &SweepMetrics {
        &self.inner.sweep_metrics
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stop the heartbeat and close every idle session
    ///
    /// Checkouts already waiting and all later ones fail with
    /// [`PoolError::Closed`]; sessions still checked out are closed when
    /// they come back.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Wake blocked checkouts before anything that awaits
        self.inner.idle.close();

        let heartbeat = self
            .inner
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(heartbeat) = heartbeat {
            heartbeat.stop().await;
        }

        let drained = self.inner.idle.drain();
        let count = drained.len();
        for session in drained {
            self.drop_session(session);
        }
        info!(
            "Tracker pool shut down, closed {} idle session(s), {} still checked out",
            count,
            self.inner.outstanding.load(Ordering::Acquire)
        );
    }

    // Heartbeat access: pop, push and discard without the checkin policy

    pub(crate) fn downgrade(&self) -> WeakTrackerPool {
        WeakTrackerPool(Arc::downgrade(&self.inner))
    }

    pub(crate) fn idle_len(&self) -> usize {
        self.inner.idle.len()
    }

    pub(crate) async fn take_idle(&self, wait: Duration) -> Option<TrackerSession> {
        self.inner.idle.pop_timeout(wait).await
    }

    pub(crate) fn return_idle(&self, session: TrackerSession) {
        if self.is_closed() {
            self.drop_session(session);
        } else {
            self.inner.idle.push(session);
        }
    }
}
