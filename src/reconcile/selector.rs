//! Selection of entries that need a fresh probe.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::directory::{freshness_cutoff, ServerEntry};
use crate::storage::ServerStore;

/// Stale entries for one pass, plus whether the store could be read at all.
#[derive(Debug, Default)]
pub struct StaleSelection {
    pub entries: Vec<ServerEntry>,
    /// The store read failed; `entries` is empty because of it, not because
    /// everything is fresh
    pub store_unavailable: bool,
}

/// Read-only query for entries needing reconciliation.
#[derive(Clone)]
pub struct StaleEntrySelector {
    store: ServerStore,
}

impl StaleEntrySelector {
    pub fn new(store: ServerStore) -> Self {
        Self { store }
    }

    /// Entries with no city, never probed, or last probed before `now - window`.
    ///
    /// A store failure is logged and reported through
    /// [`StaleSelection::store_unavailable`] with an empty entry list.
    pub async fn select_stale(&self, now: DateTime<Utc>, window: Duration) -> StaleSelection {
        let cutoff = freshness_cutoff(now, window);
        match self.store.find_stale(cutoff).await {
            Ok(entries) => {
                debug!(
                    "{} stale entries (cutoff {})",
                    entries.len(),
                    cutoff.to_rfc3339()
                );
                StaleSelection {
                    entries,
                    store_unavailable: false,
                }
            }
            Err(e) => {
                error!("Could not select stale server entries: {e}");
                StaleSelection {
                    entries: Vec::new(),
                    store_unavailable: true,
                }
            }
        }
    }
}
