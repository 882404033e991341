//! HTTP route layer.
//!
//! Routes:
//! - `/` - welcome text
//! - `/getNearbyTaxiDash` - nearest servers to a coordinate
//! - `/getTaxiDashByName` - servers by city and/or state
//! - `/getAllTaxiDashNames` - every named server
//! - `/servers` (POST) - registration
//! - `/status` - JSON reconciliation status
//! - `/metrics` - Prometheus-compatible metrics
//!
//! Handlers only translate between HTTP and the [`Directory`](crate::directory::Directory).

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use handlers::{
    all_names_handler, by_name_handler, metrics_handler, nearby_handler, register_handler,
    status_handler, welcome_handler,
};
pub use types::{ApiError, ApiState, ErrorBody, StatusResponse};

/// Builds the router with every route attached to `state`.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(welcome_handler))
        .route("/getNearbyTaxiDash", get(nearby_handler))
        .route("/getTaxiDashByName", get(by_name_handler))
        .route("/getAllTaxiDashNames", get(all_names_handler))
        .route("/servers", post(register_handler))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Binds the listen address.
pub async fn bind(listen_addr: &str) -> Result<TcpListener, anyhow::Error> {
    TcpListener::bind(listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind API server to {}: {}", listen_addr, e))
}

/// Serves the API on `listener` until `shutdown` fires.
pub async fn start_api_server(
    listener: TcpListener,
    state: ApiState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("TaxiDash registration server listening on http://{}/", addr);
        log::info!("  - Status: http://{}/status", addr);
        log::info!("  - Metrics: http://{}/metrics", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))?;

    Ok(())
}
