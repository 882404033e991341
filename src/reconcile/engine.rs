//! One reconciliation pass over the stale part of the directory.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::Semaphore;

use crate::directory::{PassSummary, ProbeResult, ServerEntry};
use crate::error_handling::{update_probe_error_stats, ReconcileStats};
use crate::probe::InfoProber;
use crate::reconcile::selector::StaleEntrySelector;
use crate::self_address::SelfAddressResolver;
use crate::storage::ServerStore;

/// What happened to one entry during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryOutcome {
    Updated,
    Failed,
}

/// Probes stale entries concurrently and writes successful results back.
///
/// Each probe task owns the entry it was spawned for, so its result can only
/// ever be applied to that entry's id regardless of completion order.
pub struct ReconciliationEngine {
    selector: StaleEntrySelector,
    store: ServerStore,
    prober: InfoProber,
    self_address: Arc<SelfAddressResolver>,
    semaphore: Arc<Semaphore>,
    freshness_window: Duration,
    stats: Arc<ReconcileStats>,
}

impl ReconciliationEngine {
    pub fn new(
        store: ServerStore,
        prober: InfoProber,
        self_address: Arc<SelfAddressResolver>,
        semaphore: Arc<Semaphore>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            selector: StaleEntrySelector::new(store.clone()),
            store,
            prober,
            self_address,
            semaphore,
            freshness_window,
            stats: Arc::new(ReconcileStats::new()),
        }
    }

    pub fn stats(&self) -> Arc<ReconcileStats> {
        Arc::clone(&self.stats)
    }

    pub fn self_address(&self) -> &SelfAddressResolver {
        &self.self_address
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Runs one pass: select stale entries, probe them, apply the successes.
    ///
    /// Never fails. Probe failures leave their entries untouched (and therefore
    /// still stale); a store that can't be read yields an empty summary with
    /// `store_unavailable` set.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> PassSummary {
        let selection = self.selector.select_stale(now, self.freshness_window).await;
        if selection.store_unavailable {
            self.stats.record_store_read_failure();
            self.stats.record_pass(Utc::now().timestamp_millis());
            return PassSummary {
                store_unavailable: true,
                ..PassSummary::default()
            };
        }

        // Read once so every probe in the pass sees the same address
        let self_address = self.self_address.cached().await;

        let (probeable, without_ip): (Vec<ServerEntry>, Vec<ServerEntry>) =
            selection.entries.into_iter().partition(ServerEntry::has_ip);
        for entry in &without_ip {
            debug!("Skipping entry {} without an address", entry.id);
        }
        self.stats.record_skipped_without_ip(without_ip.len());

        let mut summary = PassSummary {
            skipped: without_ip.len(),
            ..PassSummary::default()
        };

        let mut tasks = FuturesUnordered::new();
        for entry in probeable {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Semaphore closed, not probing entry {}", entry.id);
                    summary.failed += 1;
                    continue;
                }
            };

            summary.attempted += 1;
            self.stats.record_probe_attempt();

            let prober = self.prober.clone();
            let store = self.store.clone();
            let stats = Arc::clone(&self.stats);
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let result = prober.probe(&entry, self_address).await;
                apply_result(&store, &stats, entry, result, now).await
            }));
        }

        while let Some(task_result) = tasks.next().await {
            match task_result {
                Ok(EntryOutcome::Updated) => summary.succeeded += 1,
                Ok(EntryOutcome::Failed) => summary.failed += 1,
                Err(join_error) => {
                    summary.failed += 1;
                    warn!("Probe task panicked: {:?}", join_error);
                }
            }
        }

        self.stats.record_pass(Utc::now().timestamp_millis());
        info!(
            "Reconciliation pass: {} probed, {} updated, {} failed, {} skipped",
            summary.attempted, summary.succeeded, summary.failed, summary.skipped
        );
        summary
    }
}

async fn apply_result(
    store: &ServerStore,
    stats: &ReconcileStats,
    entry: ServerEntry,
    result: ProbeResult,
    now: DateTime<Utc>,
) -> EntryOutcome {
    match result {
        ProbeResult::Success(info) => match store.apply_server_info(entry.id, &info, now).await {
            Ok(()) => {
                stats.record_probe_success();
                debug!(
                    "Entry {} ({}) is in {}, {}",
                    entry.id, entry.ip, info.city, info.state
                );
                EntryOutcome::Updated
            }
            Err(e) => {
                stats.record_store_write_failure();
                warn!("Failed to store probe result for entry {}: {}", entry.id, e);
                EntryOutcome::Failed
            }
        },
        ProbeResult::Failure(e) => {
            update_probe_error_stats(stats, &e);
            warn!("Probe of entry {} ({}) failed: {}", entry.id, entry.ip, e);
            EntryOutcome::Failed
        }
    }
}
