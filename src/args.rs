//! Command-line arguments for the `fdfs-pool` binary

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Tracker connection pool for FastDFS clients
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "fdfs-pool.toml", env = "FDFS_CONFIG")]
    pub config: PathBuf,

    /// Number of worker threads (default: CPU cores, 1 uses a current-thread runtime)
    #[arg(short, long, env = "FDFS_THREADS")]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the pool, prewarm, run the heartbeat and log status until Ctrl-C
    Run {
        /// Seconds between status log lines (0 disables)
        #[arg(long, default_value = "60")]
        status_interval: u64,
    },
    /// Validate the configuration and probe every tracker once
    Check,
}

impl Default for Command {
    fn default() -> Self {
        Self::Run {
            status_interval: 60,
        }
    }
}

impl Args {
    /// Subcommand to execute, `run` when none was given
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Worker threads to use, falling back to available parallelism
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.threads.filter(|&n| n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1)
        })
    }
}

impl Command {
    /// Interval between status lines for `run`
    #[must_use]
    pub fn status_interval(&self) -> Option<Duration> {
        match self {
            Self::Run { status_interval } if *status_interval > 0 => {
                Some(Duration::from_secs(*status_interval))
            }
            _ => None,
        }
    }
}
