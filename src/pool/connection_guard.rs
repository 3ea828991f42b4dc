//! Checkout guard that hands a session back to the pool on every path
//!
//! Callers that hold a session across fallible I/O can forget to check it in
//! on an early return. [`PooledSession`] makes the outcome explicit:
//! [`release`](PooledSession::release) keeps the session,
//! [`discard`](PooledSession::discard) drops it, and a guard dropped without
//! either is discarded, since its stream may be mid-exchange.

use std::ops::{Deref, DerefMut};
use tracing::debug;

use super::connection_pool::TrackerPool;
use super::session::TrackerSession;
use crate::connection_error::is_connection_error;
use crate::types::RequestId;

/// A checked-out session bound to its pool
#[derive(Debug)]
pub struct PooledSession {
    pool: TrackerPool,
    session: Option<TrackerSession>,
    request_id: RequestId,
}

impl PooledSession {
    pub(crate) fn new(pool: TrackerPool, session: TrackerSession, request_id: RequestId) -> Self {
        Self {
            pool,
            session: Some(session),
            request_id,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Check the session back in
    pub fn release(mut self) {
        self.pool.checkin(self.session.take());
    }

    /// Discard the session as broken
    pub fn discard(mut self) {
        self.pool.drop_session(self.session.take());
    }

    /// Release or discard depending on how an exchange ended
    ///
    /// Connection-level I/O errors (reset, broken pipe, EOF...) discard the
    /// session; success and other errors check it back in.
    pub fn finish<T>(self, result: &std::io::Result<T>) {
        match result {
            Err(e) if is_connection_error(e) => {
                debug!(request_id = %self.request_id, error = %e, "Connection error, discarding tracker session");
                self.discard();
            }
            _ => self.release(),
        }
    }
}

impl Deref for PooledSession {
    type Target = TrackerSession;

    fn deref(&self) -> &Self::Target {
        self.session
            .as_ref()
            .expect("session is present until the guard is consumed")
    }
}

impl DerefMut for PooledSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
            .as_mut()
            .expect("session is present until the guard is consumed")
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(
                request_id = %self.request_id,
                session = %session.id(),
                "Guard dropped without release, discarding tracker session"
            );
            self.pool.drop_session(session);
        }
    }
}
