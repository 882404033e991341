//! Directory reconciliation.
//!
//! A pass selects stale entries, probes each one concurrently and writes every
//! successful result back to the entry it was probed for. Failed probes leave
//! their entries as they were, so they are picked up again by a later pass.

mod engine;
mod scheduler;
mod selector;

pub use engine::ReconciliationEngine;
pub use scheduler::spawn_reconciliation_loop;
pub use selector::{StaleEntrySelector, StaleSelection};
