//! Prometheus metrics handler.

use std::fmt::Write;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::ApiState;
use crate::error_handling::ProbeErrorType;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<ApiState>) -> Response {
    let stats = &state.stats;

    let mut metrics = format!(
        r#"# HELP taxidash_reconcile_passes_total Reconciliation passes completed
# TYPE taxidash_reconcile_passes_total counter
taxidash_reconcile_passes_total {}

# HELP taxidash_probes_attempted_total Metadata probes started
# TYPE taxidash_probes_attempted_total counter
taxidash_probes_attempted_total {}

# HELP taxidash_probes_succeeded_total Probes whose result was stored
# TYPE taxidash_probes_succeeded_total counter
taxidash_probes_succeeded_total {}

# HELP taxidash_entries_skipped_total Stale entries skipped for lack of an address
# TYPE taxidash_entries_skipped_total counter
taxidash_entries_skipped_total {}

# HELP taxidash_store_read_failures_total Passes aborted because the store could not be read
# TYPE taxidash_store_read_failures_total counter
taxidash_store_read_failures_total {}

# HELP taxidash_store_write_failures_total Probe results that could not be stored
# TYPE taxidash_store_write_failures_total counter
taxidash_store_write_failures_total {}

# HELP taxidash_probe_errors_total Failed probes by kind
# TYPE taxidash_probe_errors_total counter
"#,
        stats.passes(),
        stats.probes_attempted(),
        stats.probes_succeeded(),
        stats.skipped_without_ip(),
        stats.store_read_failures(),
        stats.store_write_failures(),
    );

    for kind in ProbeErrorType::iter() {
        // Writing to a String cannot fail
        let _ = writeln!(
            metrics,
            "taxidash_probe_errors_total{{kind=\"{}\"}} {}",
            kind.label(),
            stats.get_probe_error_count(kind)
        );
    }

    (StatusCode::OK, metrics).into_response()
}
