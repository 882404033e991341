//! Route layer data structures.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::directory::Directory;
use crate::error_handling::{DirectoryError, ReconcileStats, ValidationError};
use crate::self_address::SelfAddressResolver;

/// Shared state for all routes
#[derive(Clone)]
pub struct ApiState {
    pub directory: Directory,
    pub stats: Arc<ReconcileStats>,
    pub self_address: Arc<SelfAddressResolver>,
    pub start_time: Arc<Instant>,
}

/// JSON response for `/status`
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_address: Option<String>,
    pub passes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pass_at: Option<String>,
    pub probes: ProbeCounts,
    pub store: StoreCounts,
}

#[derive(Serialize)]
pub struct ProbeCounts {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped_without_ip: usize,
    /// Failures by kind, keyed by [`ProbeErrorType::label`](crate::error_handling::ProbeErrorType::label)
    pub errors: BTreeMap<&'static str, usize>,
}

#[derive(Serialize)]
pub struct StoreCounts {
    pub read_failures: usize,
    pub write_failures: usize,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Directory errors mapped to status codes.
pub struct ApiError(pub DirectoryError);

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        ApiError(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ValidationError::MalformedRequest(rejection.body_text()).into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ValidationError::MalformedRequest(rejection.body_text()).into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DirectoryError::Validation(_) => StatusCode::BAD_REQUEST,
            DirectoryError::StoreUnavailable(e) => {
                log::error!("Directory store unavailable: {e}");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        let error = match &self.0 {
            DirectoryError::Validation(e) => e.to_string(),
            DirectoryError::StoreUnavailable(_) => "directory store unavailable".to_string(),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
