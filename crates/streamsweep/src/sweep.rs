//! Consumer Reclaim Sweep
//!
//! Evicts dead consumers from the consumer groups of one stream without
//! losing the work that was in flight on them.
//!
//! ## How the sweep works
//!
//! 1. List the stream's consumer groups and report them
//! 2. For each group that has pending entries, list its consumers
//! 3. A consumer idle beyond the threshold is considered dead:
//!    - page through the group's pending list and claim every entry the
//!      dead consumer owns over to the reclaiming identity
//!    - remove the dead consumer's registration from the group
//! 4. Re-query and report the groups to show the post-sweep state
//!
//! ## Failure semantics
//!
//! This is a best-effort maintenance pass, not a transaction. A claim that
//! fails is logged and the remaining entries are still attempted; a
//! removal that fails is logged and the remaining consumers are still
//! processed; a group whose consumers cannot be listed is skipped. Only a
//! failure to enumerate the groups at all aborts the run. Partial progress
//! is fine: the sweep is designed to be re-run until every dead consumer
//! is gone.
//!
//! Overlapping runs are safe without any local locking: ownership
//! transfer is guarded server-side by the claim min-idle time, so two
//! sweeps racing for the same entry resolve to one winner and one no-op.

use std::sync::Arc;
use std::time::Duration;

use streamsweep_broker::{EntryId, GroupInfo, Result, StreamBroker};
use tracing::{debug, info, warn};

/// The stream whose consumer groups this sweep maintains.
pub const CREDIT_EVENTS_STREAM: &str = "credit-events";

/// Reclaiming identity that takes ownership of entries claimed away from
/// dead consumers. Registered in a group the first time an entry is
/// claimed into it; never deleted by the sweep.
pub const CLEANUP_CONSUMER: &str = "cleanup-consumer";

/// Sweep configuration
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Stream whose groups are swept (default: `credit-events`)
    pub stream: String,
    /// Consumers idle at or below this are left untouched (default: 5 minutes)
    pub idle_threshold: Duration,
    /// Minimum idle time passed to every claim; the server declines the
    /// transfer for entries idle less than this (default: 1 minute)
    pub claim_min_idle: Duration,
    /// Pending entries fetched per range query while paging (default: 10)
    pub pending_page: usize,
    /// Name of the reclaiming identity (default: `cleanup-consumer`)
    pub claimer: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            stream: CREDIT_EVENTS_STREAM.to_string(),
            idle_threshold: Duration::from_millis(300_000), // 5 minutes
            claim_min_idle: Duration::from_millis(60_000),  // 1 minute
            pending_page: 10,
            claimer: CLEANUP_CONSUMER.to_string(),
        }
    }
}

/// Counters for one sweep run, reported at the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepStats {
    /// Consumer groups found on the stream
    pub groups_seen: u64,
    /// Groups actually inspected (pending entries present, consumers listed)
    pub groups_swept: u64,
    /// Consumers looked at across all swept groups
    pub consumers_inspected: u64,
    /// Dead consumers removed from their group
    pub consumers_evicted: u64,
    /// Pending entries claimed over to the reclaiming identity
    pub entries_reclaimed: u64,
    /// Claim attempts that errored (declined claims are not failures)
    pub claim_failures: u64,
    /// Consumer removals that errored
    pub delete_failures: u64,
}

/// One-shot consumer reclaim sweep over a stream's consumer groups.
pub struct SweepTask {
    broker: Arc<dyn StreamBroker>,
    config: SweepConfig,
}

impl SweepTask {
    pub fn new(broker: Arc<dyn StreamBroker>, config: SweepConfig) -> Self {
        Self { broker, config }
    }

    /// Run one sweep pass.
    ///
    /// Returns the run's counters. Errors only when the initial group
    /// enumeration fails; everything past that point is handled per group,
    /// per consumer, or per entry.
    pub async fn run(&self) -> Result<SweepStats> {
        let stream = &self.config.stream;
        let groups = self.broker.list_groups(stream).await?;

        info!("Consumer groups on '{}':", stream);
        report_groups(&groups);

        let mut stats = SweepStats {
            groups_seen: groups.len() as u64,
            ..SweepStats::default()
        };

        for group in &groups {
            if group.pending == 0 {
                debug!("Group '{}' has no pending entries, skipping", group.name);
                continue;
            }
            if let Err(e) = self.sweep_group(group, &mut stats).await {
                warn!("Failed to sweep group '{}': {}", group.name, e);
            }
        }

        match self.broker.list_groups(stream).await {
            Ok(after) => {
                info!("Consumer groups on '{}' after sweep:", stream);
                report_groups(&after);
            }
            Err(e) => warn!("Failed to re-query consumer groups after sweep: {}", e),
        }

        Ok(stats)
    }

    /// Inspect one group's consumers and evict the dead ones.
    async fn sweep_group(&self, group: &GroupInfo, stats: &mut SweepStats) -> Result<()> {
        let stream = &self.config.stream;
        let consumers = self.broker.list_consumers(stream, &group.name).await?;
        stats.groups_swept += 1;

        let threshold_ms = self.config.idle_threshold.as_millis() as u64;

        for consumer in &consumers {
            stats.consumers_inspected += 1;
            info!(
                "  group '{}' consumer '{}': {} pending, idle {}ms",
                group.name, consumer.name, consumer.pending, consumer.idle_ms
            );

            if consumer.idle_ms <= threshold_ms {
                continue;
            }

            info!(
                "Consumer '{}' in group '{}' idle {}ms (> {}ms), evicting",
                consumer.name, group.name, consumer.idle_ms, threshold_ms
            );

            self.reclaim_pending(&group.name, &consumer.name, stats)
                .await;

            // Removal drops whatever is still pending on the consumer, so
            // it comes after the claim attempts - but it is not gated on
            // them, otherwise a single poisoned entry would keep a dead
            // consumer registered forever.
            match self
                .broker
                .delete_consumer(stream, &group.name, &consumer.name)
                .await
            {
                Ok(dropped) => {
                    stats.consumers_evicted += 1;
                    if dropped > 0 {
                        warn!(
                            "✓ Removed consumer '{}' from group '{}' ({} pending entries dropped with it)",
                            consumer.name, group.name, dropped
                        );
                    } else {
                        info!(
                            "✓ Removed consumer '{}' from group '{}'",
                            consumer.name, group.name
                        );
                    }
                }
                Err(e) => {
                    stats.delete_failures += 1;
                    warn!(
                        "Failed to remove consumer '{}' from group '{}': {}",
                        consumer.name, group.name, e
                    );
                }
            }
        }

        Ok(())
    }

    /// Claim every pending entry owned by `consumer` over to the
    /// reclaiming identity, paging through the group's pending list until
    /// the range is exhausted.
    async fn reclaim_pending(&self, group: &str, consumer: &str, stats: &mut SweepStats) {
        let stream = &self.config.stream;
        let min_idle_ms = self.config.claim_min_idle.as_millis() as u64;
        let mut start = EntryId::MIN;

        loop {
            let page = match self
                .broker
                .pending_entries(stream, group, start, EntryId::MAX, self.config.pending_page)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Failed to list pending entries of group '{}': {}",
                        group, e
                    );
                    return;
                }
            };

            let Some(last_id) = page.last().map(|entry| entry.id) else {
                return;
            };

            for entry in page.iter().filter(|entry| entry.consumer == consumer) {
                match self
                    .broker
                    .claim_entry(stream, group, &self.config.claimer, min_idle_ms, entry.id)
                    .await
                {
                    Ok(true) => {
                        stats.entries_reclaimed += 1;
                        info!(
                            "✓ Claimed entry {} ({} deliveries) from '{}' for '{}'",
                            entry.id, entry.delivery_count, consumer, self.config.claimer
                        );
                    }
                    Ok(false) => {
                        // Already reclaimed elsewhere, or acknowledged in
                        // the meantime.
                        debug!("Entry {} no longer claimable, skipping", entry.id);
                    }
                    Err(e) => {
                        stats.claim_failures += 1;
                        warn!("Failed to claim entry {} from '{}': {}", entry.id, consumer, e);
                    }
                }
            }

            if page.len() < self.config.pending_page {
                return;
            }
            start = last_id.next();
        }
    }
}

fn report_groups(groups: &[GroupInfo]) {
    if groups.is_empty() {
        info!("  (no consumer groups)");
        return;
    }
    for group in groups {
        info!(
            "  group '{}': {} pending, {} consumers",
            group.name, group.pending, group.consumers
        );
    }
}
