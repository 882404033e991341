// Shared test helpers for directory setup and probe targets.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use taxidash_registry::initialization::init_semaphore;
use taxidash_registry::probe::InfoProber;
use taxidash_registry::storage::init_db_pool_with_path;
use taxidash_registry::{run_migrations, ReconciliationEngine, SelfAddressResolver, ServerStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)] // Used by other test files
pub const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Creates a file-backed store with migrations applied, the way the service opens it.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store(db_path: &Path) -> ServerStore {
    let pool = init_db_pool_with_path(db_path)
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    ServerStore::new(pool)
}

/// Starts a mock TaxiDash server answering `general_info.json` after `delay`.
#[allow(dead_code)] // Used by other test files
pub async fn general_info_server(city: &str, state: &str, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/general_info.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"city": city, "state": state}))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

/// Builds an engine over `store` with loopback rewriting disabled.
#[allow(dead_code)] // Used by other test files
pub fn create_engine(store: ServerStore, probe_timeout: Duration) -> ReconciliationEngine {
    create_engine_with_self_address(store, probe_timeout, SelfAddressResolver::disabled())
}

#[allow(dead_code)] // Used by other test files
pub fn create_engine_with_self_address(
    store: ServerStore,
    probe_timeout: Duration,
    self_address: SelfAddressResolver,
) -> ReconciliationEngine {
    ReconciliationEngine::new(
        store,
        InfoProber::new(Arc::new(reqwest::Client::new()), probe_timeout),
        Arc::new(self_address),
        init_semaphore(8),
        WEEK,
    )
}
