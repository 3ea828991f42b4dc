use anyhow::{Result, bail};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use fdfs_pool::args::{Args, Command};
use fdfs_pool::config::PoolConfig;
use fdfs_pool::logging::init_dual_logging;
use fdfs_pool::pool::ConnectionFactory;
use fdfs_pool::{RequestId, TrackerPool, load_config_with_fallback};

fn main() -> Result<()> {
    let args = Args::parse();
    init_dual_logging();

    let worker_threads = args.worker_threads();
    let rt = if worker_threads == 1 {
        info!("Starting fdfs-pool with single-threaded runtime");
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
    } else {
        info!("Starting fdfs-pool with {} worker threads", worker_threads);
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .enable_all()
            .build()?
    };

    rt.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let (config, source) = load_config_with_fallback(&args.config)?;
    info!("Loaded configuration from {}", source.description());

    if !config.pool.enable {
        info!("Tracker pool is disabled (enable = false), nothing to do");
        return Ok(());
    }

    let pool_config = config.pool.to_pool_config()?;
    info!(
        "Using {} tracker(s), pool size {}..{}, wait timeout {:?}",
        pool_config.trackers().len(),
        pool_config.min_size(),
        pool_config.max_size(),
        pool_config.wait_timeout()
    );
    for tracker in pool_config.trackers() {
        info!("  - {}", tracker);
    }
    if let Some(proxy) = &config.pool.file_proxy_server {
        info!("File proxy server: {}", proxy);
    }

    match args.command() {
        command @ Command::Run { .. } => run_pool(pool_config, command).await,
        Command::Check => check_trackers(&pool_config).await,
    }
}

async fn run_pool(config: PoolConfig, command: Command) -> Result<()> {
    let pool = TrackerPool::start(config).await;
    info!("Tracker pool ready: {}", pool.status());

    let status_interval = command.status_interval();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal, closing tracker pool");
                break;
            }
            _ = async {
                match status_interval {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                let metrics = pool.sweep_metrics();
                info!(
                    "Pool status: {} | sweeps={} checked={} failed={}",
                    pool.status(),
                    metrics.cycles_run(),
                    metrics.sessions_checked(),
                    metrics.sessions_failed()
                );
            }
        }
    }

    pool.shutdown().await;
    Ok(())
}

/// Open and probe one session per tracker, reporting each result
async fn check_trackers(config: &PoolConfig) -> Result<()> {
    let mut failed = 0;

    for tracker in config.trackers() {
        let single = PoolConfig::builder([tracker.to_string()])
            .min_size(0)
            .connect_timeout(config.connect_timeout())
            .network_timeout(config.network_timeout())
            .connect_attempts(1)
            .build()?;

        match ConnectionFactory::new(&single).open(RequestId::new()).await {
            Ok(session) => {
                info!("Tracker {} OK", tracker);
                session.close();
            }
            Err(e) => {
                error!("Tracker {} FAILED: {}", tracker, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        warn!("{}/{} tracker(s) failed", failed, config.trackers().len());
        bail!("{failed} tracker(s) unreachable");
    }

    info!("All {} tracker(s) reachable", config.trackers().len());
    Ok(())
}
