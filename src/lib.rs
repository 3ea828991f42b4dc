//! # fdfs-pool
//!
//! A connection pool for FastDFS tracker sessions.
//!
//! Opening a tracker connection costs a TCP handshake and a protocol
//! exchange, so storage clients keep a small set of live sessions and reuse
//! them:
//!
//! - sessions are created lazily up to a soft ceiling (`max_pool_size`)
//! - at most `min_pool_size` idle sessions are retained after checkin
//! - checkout waits a bounded time for an idle session
//! - a heartbeat periodically probes idle sessions and discards dead ones
//!
//! ```no_run
//! use fdfs_pool::{PoolConfig, RequestId, TrackerPool};
//!
//! # async fn example() -> Result<(), fdfs_pool::PoolError> {
//! let config = PoolConfig::builder(["192.168.1.100:22122"]).build()?;
//! let pool = TrackerPool::start(config).await;
//!
//! let session = pool.checkout(RequestId::new()).await?;
//! // ... talk to the tracker through session.stream_mut() ...
//! pool.checkin(session);
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod connection_error;
pub mod constants;
pub mod logging;
pub mod pool;
pub mod protocol;
pub mod types;

pub use config::{
    Config, ConfigSource, PoolConfig, PoolConfigBuilder, PoolSettings, TrackerList,
    create_default_config, load_config, load_config_with_fallback,
};
pub use connection_error::{ConfigError, ConnectionError, PoolError, is_connection_error};
pub use pool::{
    Heartbeat, PooledSession, SweepMetrics, SweepReport, TrackerPool, TrackerSession, sweep_once,
};
pub use types::{PoolStatus, RequestId, SessionId, TrackerAddr};
