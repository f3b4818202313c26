//! Streamsweep Binary
//!
//! One-shot consumer reclaim sweep over the `credit-events` stream.
//! Intended to be run periodically (cron) or by hand; each invocation
//! connects, sweeps once, reports, and exits.
//!
//! # Environment Variables
//!
//! - `REDIS_URL`: Redis address (required, e.g. `redis://127.0.0.1:6379/`)
//! - `SWEEP_IDLE_THRESHOLD_MS`: idle time beyond which a consumer is
//!   considered dead (default: 300000)
//! - `SWEEP_CLAIM_MIN_IDLE_MS`: min-idle parameter passed to every claim
//!   (default: 60000)
//! - `SWEEP_PENDING_PAGE`: pending entries fetched per range query
//!   (default: 10)
//! - `RUST_LOG`: log filter (default: info)
//!
//! # Exit codes
//!
//! - `0`: sweep completed, even if individual claims or removals failed
//! - `1`: missing `REDIS_URL`, connection failure, or the consumer groups
//!   could not be enumerated at all
//!
//! # Example
//!
//! ```bash
//! export REDIS_URL=redis://127.0.0.1:6379/
//! cargo run --bin streamsweep
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use streamsweep::{SweepConfig, SweepTask};
use streamsweep_broker::{RedisStreamBroker, StreamBroker};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        bail!("REDIS_URL environment variable required");
    };

    let mut config = SweepConfig::default();
    if let Some(threshold) = env_millis("SWEEP_IDLE_THRESHOLD_MS") {
        config.idle_threshold = threshold;
    }
    if let Some(min_idle) = env_millis("SWEEP_CLAIM_MIN_IDLE_MS") {
        config.claim_min_idle = min_idle;
    }
    if let Some(page) = env_usize("SWEEP_PENDING_PAGE") {
        config.pending_page = page;
    }

    info!("🧹 streamsweep starting...");
    info!("Configuration:");
    info!("  Stream: {}", config.stream);
    info!("  Idle threshold: {:?}", config.idle_threshold);
    info!("  Claim min-idle: {:?}", config.claim_min_idle);
    info!("  Pending page size: {}", config.pending_page);
    info!("  Reclaiming identity: {}", config.claimer);

    let broker = RedisStreamBroker::connect(&redis_url)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", redis_url))?;
    info!("✓ Connected to Redis");

    let task = SweepTask::new(Arc::new(broker) as Arc<dyn StreamBroker>, config);
    let stats = task
        .run()
        .await
        .context("Failed to enumerate consumer groups")?;

    info!(
        "Sweep complete: {} group(s) swept, {} consumer(s) evicted, {} entr(ies) reclaimed, {} claim failure(s), {} removal failure(s)",
        stats.groups_swept,
        stats.consumers_evicted,
        stats.entries_reclaimed,
        stats.claim_failures,
        stats.delete_failures
    );

    Ok(())
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
}
