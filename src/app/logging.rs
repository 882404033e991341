//! Periodic status logging.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ProbeErrorType, ReconcileStats};

/// Logs a one-line summary of reconciliation counters.
pub fn log_reconcile_status(stats: &ReconcileStats) {
    info!(
        "Reconciliation: {} passes, {} probes ({} stored, {} failed), {} skipped without address",
        stats.passes(),
        stats.probes_attempted(),
        stats.probes_succeeded(),
        stats.total_probe_errors() + stats.store_write_failures(),
        stats.skipped_without_ip()
    );
}

/// Logs the count of each probe failure kind seen so far.
pub fn log_probe_error_statistics(stats: &ReconcileStats) {
    let total_errors = stats.total_probe_errors();
    if total_errors > 0 {
        info!("Probe error counts ({} total):", total_errors);
        for kind in ProbeErrorType::iter() {
            let count = stats.get_probe_error_count(kind);
            if count > 0 {
                info!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}

/// Spawns a task that logs the status every `interval` until `cancel` fires.
pub fn spawn_status_logging(
    stats: Arc<ReconcileStats>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        // The first tick completes immediately; nothing has happened yet
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_reconcile_status(&stats);
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}
