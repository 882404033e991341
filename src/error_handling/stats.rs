//! Reconciliation statistics tracking.
//!
//! Thread-safe counters for passes, probe outcomes and store failures, shared
//! between the reconciliation engine and the status endpoints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ProbeErrorType;

/// Thread-safe reconciliation statistics tracker.
///
/// All probe error types are initialized to zero on creation so increments
/// never allocate. Shared across tasks through `Arc`.
pub struct ReconcileStats {
    probe_errors: HashMap<ProbeErrorType, AtomicUsize>,
    passes: AtomicUsize,
    probes_attempted: AtomicUsize,
    probes_succeeded: AtomicUsize,
    skipped_without_ip: AtomicUsize,
    store_read_failures: AtomicUsize,
    store_write_failures: AtomicUsize,
    last_pass_ms: AtomicUsize,
}

impl ReconcileStats {
    pub fn new() -> Self {
        let mut probe_errors = HashMap::new();
        for kind in ProbeErrorType::iter() {
            probe_errors.insert(kind, AtomicUsize::new(0));
        }

        ReconcileStats {
            probe_errors,
            passes: AtomicUsize::new(0),
            probes_attempted: AtomicUsize::new(0),
            probes_succeeded: AtomicUsize::new(0),
            skipped_without_ip: AtomicUsize::new(0),
            store_read_failures: AtomicUsize::new(0),
            store_write_failures: AtomicUsize::new(0),
            last_pass_ms: AtomicUsize::new(0),
        }
    }

    /// Increment a probe error counter.
    pub fn increment_probe_error(&self, kind: ProbeErrorType) {
        if let Some(counter) = self.probe_errors.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment probe error counter for {:?} which is not in the map. \
                 This indicates a bug in ReconcileStats initialization.",
                kind
            );
        }
    }

    pub fn get_probe_error_count(&self, kind: ProbeErrorType) -> usize {
        self.probe_errors
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_probe_errors(&self) -> usize {
        self.probe_errors
            .values()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    pub fn record_pass(&self, finished_at_ms: i64) {
        self.passes.fetch_add(1, Ordering::SeqCst);
        // Negative timestamps only happen with a broken clock; clamp rather than wrap
        self.last_pass_ms
            .store(usize::try_from(finished_at_ms).unwrap_or(0), Ordering::SeqCst);
    }

    pub fn record_probe_attempt(&self) {
        self.probes_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_probe_success(&self) {
        self.probes_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_without_ip(&self, count: usize) {
        self.skipped_without_ip.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_store_read_failure(&self) {
        self.store_read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_write_failure(&self) {
        self.store_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    pub fn probes_attempted(&self) -> usize {
        self.probes_attempted.load(Ordering::SeqCst)
    }

    pub fn probes_succeeded(&self) -> usize {
        self.probes_succeeded.load(Ordering::SeqCst)
    }

    pub fn skipped_without_ip(&self) -> usize {
        self.skipped_without_ip.load(Ordering::SeqCst)
    }

    pub fn store_read_failures(&self) -> usize {
        self.store_read_failures.load(Ordering::SeqCst)
    }

    pub fn store_write_failures(&self) -> usize {
        self.store_write_failures.load(Ordering::SeqCst)
    }

    /// Epoch millis at which the last pass finished, `None` before the first pass.
    pub fn last_pass_ms(&self) -> Option<i64> {
        match self.last_pass_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => i64::try_from(ms).ok(),
        }
    }
}

impl Default for ReconcileStats {
    fn default() -> Self {
        Self::new()
    }
}
