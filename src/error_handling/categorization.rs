//! Probe error categorization.
//!
//! Maps transport-level `reqwest` failures onto [`ProbeErrorType`] so every
//! failure path is counted in exactly one bucket.

use super::stats::ReconcileStats;
use super::types::{ProbeError, ProbeErrorType};

/// Categorizes a `reqwest::Error` into a `ProbeErrorType`.
///
/// Status errors are checked first because `error_for_status` produces errors
/// that are also flagged as requests.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ProbeErrorType {
    if error.status().is_some() || error.is_status() {
        return ProbeErrorType::HttpStatus;
    }

    if error.is_builder() {
        ProbeErrorType::InvalidTarget
    } else if error.is_timeout() {
        ProbeErrorType::Timeout
    } else if error.is_connect() {
        ProbeErrorType::Connect
    } else if error.is_body() {
        ProbeErrorType::Body
    } else if error.is_decode() {
        ProbeErrorType::Decode
    } else {
        ProbeErrorType::Request
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        ProbeError::new(categorize_reqwest_error(&error), error.to_string())
    }
}

/// Records a probe failure in the statistics.
pub fn update_probe_error_stats(stats: &ReconcileStats, error: &ProbeError) {
    stats.increment_probe_error(error.kind);
}
