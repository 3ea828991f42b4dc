//! Periodic liveness sweeps over idle sessions
//!
//! Runs with fixed delay: the next sweep is scheduled `interval` after the
//! previous one finished. Sweeps only use pool operations (pop, push,
//! discard) and can overlap with normal checkout traffic.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection_pool::{TrackerPool, WeakTrackerPool};
use super::health_check::{SweepMetrics, SweepReport};

/// Handle to a running heartbeat task
#[derive(Debug)]
pub struct Heartbeat {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl Heartbeat {
    pub(crate) fn spawn(
        pool: WeakTrackerPool,
        interval: Duration,
        poll_timeout: Duration,
        metrics: Arc<SweepMetrics>,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(async move {
            info!("Starting tracker heartbeat (interval: {:?})", interval);

            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.recv() => {
                        debug!("Tracker heartbeat received shutdown signal");
                        break;
                    }
                }

                let Some(pool) = pool.upgrade() else {
                    debug!("Tracker pool dropped, stopping heartbeat");
                    break;
                };
                if pool.is_closed() {
                    break;
                }

                let report = sweep_once(&pool, poll_timeout).await;
                metrics.record_cycle(&report);
            }

            info!("Tracker heartbeat stopped");
        });

        Self { shutdown_tx, task }
    }

    /// Ask the task to stop without waiting for it
    pub fn signal(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Stop the task and wait until it has exited
    pub async fn stop(self) {
        self.signal();
        if let Err(e) = self.task.await {
            warn!("Tracker heartbeat task ended abnormally: {}", e);
        }
    }
}

/// Probe every session that is idle right now
///
/// Snapshots the idle count, then pops that many sessions (each with
/// `poll_timeout`), probing each one. Healthy sessions go back to the idle
/// registry; failed ones are closed and discarded. The sweep ends early when
/// a pop times out, which happens when concurrent checkouts took sessions.
pub async fn sweep_once(pool: &TrackerPool, poll_timeout: Duration) -> SweepReport {
    let network_timeout = pool.config().network_timeout();
    let mut report = SweepReport {
        snapshot: pool.idle_len(),
        ..SweepReport::default()
    };

    for _ in 0..report.snapshot {
        let Some(mut session) = pool.take_idle(poll_timeout).await else {
            break;
        };
        report.checked += 1;

        match session.probe(network_timeout).await {
            Ok(()) => pool.return_idle(session),
            Err(e) => {
                warn!(
                    session = %session.id(),
                    tracker = %session.tracker(),
                    error = %e,
                    "Tracker session failed heartbeat probe, discarding"
                );
                report.failed += 1;
                pool.drop_session(session);
            }
        }
    }

    if report.failed > 0 {
        info!(
            "Heartbeat sweep: {}/{} idle session(s) failed and were discarded",
            report.failed, report.checked
        );
    } else {
        debug!("Heartbeat sweep: {} idle session(s) healthy", report.checked);
    }

    report
}
