//! Configuration module
//!
//! This module handles configuration types, loading and validation
//! for the tracker pool.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{
    ConfigSource, create_default_config, has_pool_env_vars, load_config, load_config_from_env,
    load_config_with_fallback,
};
pub use types::{Config, PoolConfig, PoolConfigBuilder, PoolSettings, TrackerList};

pub use defaults::{
    connect_attempts, heartbeat_interval, heartbeat_poll_timeout, max_pool_size, min_pool_size,
    wait_timeout,
};
