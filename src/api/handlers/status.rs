//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{TimeZone, Utc};
use strum::IntoEnumIterator;

use super::super::types::{ApiState, ProbeCounts, StatusResponse, StoreCounts};
use crate::error_handling::ProbeErrorType;

/// JSON status endpoint with reconciliation counters
pub async fn status_handler(State(state): State<ApiState>) -> Response {
    let stats = &state.stats;

    let errors = ProbeErrorType::iter()
        .map(|kind| (kind.label(), stats.get_probe_error_count(kind)))
        .collect();

    let last_pass_at = stats
        .last_pass_ms()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|at| at.to_rfc3339());

    let response = StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        self_address: state
            .self_address
            .cached()
            .await
            .map(|address| address.to_string()),
        passes: stats.passes(),
        last_pass_at,
        probes: ProbeCounts {
            attempted: stats.probes_attempted(),
            succeeded: stats.probes_succeeded(),
            failed: stats.total_probe_errors() + stats.store_write_failures(),
            skipped_without_ip: stats.skipped_without_ip(),
            errors,
        },
        store: StoreCounts {
            read_failures: stats.store_read_failures(),
            write_failures: stats.store_write_failures(),
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}
