//! Idle session registry
//!
//! A lock-free queue of idle sessions plus a [`Notify`] so that waiters can
//! block with a deadline. Pushing never blocks; the queue is unbounded.
//! Closing wakes every waiter at once.

use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{Instant, timeout_at};

use super::session::TrackerSession;

/// Thread-safe, bounded-wait queue of idle sessions
///
/// No FIFO fairness is promised between concurrent waiters.
#[derive(Debug, Default)]
pub struct IdleRegistry {
    queue: SegQueue<TrackerSession>,
    available: Notify,
    closed: AtomicBool,
}

impl IdleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session and wake one waiter
    pub fn push(&self, session: TrackerSession) {
        self.queue.push(session);
        self.available.notify_one();
    }

    /// Pop without waiting
    pub fn try_pop(&self) -> Option<TrackerSession> {
        self.queue.pop()
    }

    /// Pop, waiting up to `wait` for a session to be pushed
    ///
    /// Returns `None` at the deadline, or as soon as the registry is closed.
    pub async fn pop_timeout(&self, wait: Duration) -> Option<TrackerSession> {
        let deadline = Instant::now() + wait;

        loop {
            // Register interest before checking the queue so a push between
            // the check and the await is not missed
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_closed() {
                return None;
            }
            if let Some(session) = self.queue.pop() {
                return Some(session);
            }

            if timeout_at(deadline, notified).await.is_err() {
                return self.queue.pop();
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Stop handing out sessions and wake every waiter
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.available.notify_waiters();
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Remove every idle session
    pub fn drain(&self) -> Vec<TrackerSession> {
        std::iter::from_fn(|| self.queue.pop()).collect()
    }
}
