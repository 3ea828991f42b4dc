//! Tracker session pooling
//!
//! - [`TrackerSession`]: one live connection to a tracker node
//! - [`IdleRegistry`]: lock-free queue of idle sessions with bounded waits
//! - [`ConnectionFactory`]: round-robin connect with retry
//! - [`TrackerPool`]: checkout / checkin / drop with outstanding accounting
//! - [`Heartbeat`]: periodic liveness sweeps over idle sessions

mod connection_guard;
mod connection_pool;
mod factory;
pub mod health_check;
mod heartbeat;
mod idle;
mod session;

pub use connection_guard::PooledSession;
pub use connection_pool::TrackerPool;
pub use factory::ConnectionFactory;
pub use health_check::{SweepMetrics, SweepReport, check_tcp_alive};
pub use heartbeat::{Heartbeat, sweep_once};
pub use idle::IdleRegistry;
pub use session::TrackerSession;
