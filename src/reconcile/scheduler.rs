//! Periodic reconciliation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error_handling::LookupError;
use crate::reconcile::ReconciliationEngine;

/// Shortest interval the scheduler accepts.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Spawns a task that runs one pass immediately and then one per `interval`
/// until `cancel` fires.
///
/// A pass in progress when `cancel` fires is allowed to finish. Passes never
/// overlap within one loop: a pass that outlasts `interval` delays the next.
pub fn spawn_reconciliation_loop(
    engine: Arc<ReconciliationEngine>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Reconciliation scheduled every {}s (freshness window {}s)",
            interval.as_secs(),
            engine.freshness_window().as_secs()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    ensure_self_address(&engine).await;
                    engine.run_pass(Utc::now()).await;
                }
                _ = cancel.cancelled() => {
                    debug!("Reconciliation loop stopped");
                    break;
                }
            }
        }
    })
}

/// Looks up the self address if it isn't known yet, so a failed lookup at
/// startup is retried before every pass.
async fn ensure_self_address(engine: &ReconciliationEngine) {
    if engine.self_address().cached().await.is_some() {
        return;
    }
    match engine.self_address().resolve().await {
        Ok(_) => {}
        Err(LookupError::Disabled) => debug!("Loopback rewriting disabled"),
        Err(e) => warn!("Could not determine own public address: {e}"),
    }
}
