//! taxidash_registry library: directory of TaxiDash servers
//!
//! Servers register an address and a location. A reconciliation loop keeps each
//! entry's city and state fresh by probing the server's `general_info.json`,
//! and clients ask for the nearest registered server or one by name.
//!
//! # Example
//!
//! ```no_run
//! use taxidash_registry::{run_service, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     listen_addr: "127.0.0.1:8888".to_string(),
//!     max_concurrency: 10,
//!     ..Default::default()
//! };
//!
//! run_service(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod api;
mod app;
pub mod config;
pub mod directory;
pub mod error_handling;
pub mod geo;
pub mod initialization;
pub mod nearest;
pub mod probe;
pub mod reconcile;
pub mod self_address;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use directory::{Directory, NearestServer, PassSummary, ServerEntry, ServerInfo};
pub use geo::GeoPoint;
pub use nearest::NearestServerResolver;
pub use reconcile::ReconciliationEngine;
pub use run::run_service;
pub use self_address::SelfAddressResolver;
pub use storage::{run_migrations, ServerStore};

// Internal run module (wires the service together)
mod run {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::api::{self, ApiState};
    use crate::app::{
        log_probe_error_statistics, log_reconcile_status, shutdown_gracefully,
        spawn_status_logging, wait_for_ctrl_c,
    };
    use crate::config::{Config, STATUS_LOGGING_INTERVAL_SECS};
    use crate::directory::Directory;
    use crate::initialization::{init_client, init_lookup_client, init_semaphore};
    use crate::nearest::NearestServerResolver;
    use crate::probe::InfoProber;
    use crate::reconcile::{spawn_reconciliation_loop, ReconciliationEngine};
    use crate::self_address::SelfAddressResolver;
    use crate::storage::{init_db_pool_with_path, run_migrations, ServerStore};

    /// Runs the registration server until Ctrl-C.
    ///
    /// Opens the directory database, starts the reconciliation loop (which
    /// runs its first pass immediately) and serves the HTTP API.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - A configuration value is out of range
    /// - The database cannot be opened or migrated
    /// - The HTTP clients cannot be built
    /// - A configured self address is not an IP address
    /// - The listen address cannot be bound
    pub async fn run_service(config: Config) -> Result<()> {
        config.validate().context("Invalid configuration")?;
        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        let store = ServerStore::new(pool);

        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let lookup_client =
            init_lookup_client(&config).context("Failed to initialize lookup HTTP client")?;
        let self_address = Arc::new(
            SelfAddressResolver::from_config(&config, lookup_client)
                .context("Invalid self address")?,
        );

        let engine = Arc::new(ReconciliationEngine::new(
            store.clone(),
            InfoProber::new(client, config.probe_timeout()),
            Arc::clone(&self_address),
            init_semaphore(config.max_concurrency),
            config.freshness_window(),
        ));
        let stats = engine.stats();

        let directory = Directory::new(
            store.clone(),
            NearestServerResolver::new(store, config.max_search_radius_km),
            config.default_nearest_limit,
        );

        let listener = api::bind(&config.listen_addr).await?;

        let cancel = CancellationToken::new();
        let reconcile_task = spawn_reconciliation_loop(
            Arc::clone(&engine),
            config.reconcile_interval(),
            cancel.child_token(),
        );
        let logging_task = spawn_status_logging(
            Arc::clone(&stats),
            Duration::from_secs(STATUS_LOGGING_INTERVAL_SECS),
            cancel.child_token(),
        );

        let shutdown = cancel.clone();
        tokio::spawn(async move {
            wait_for_ctrl_c().await;
            info!("Shutdown requested");
            shutdown.cancel();
        });

        let state = ApiState {
            directory,
            stats: Arc::clone(&stats),
            self_address,
            start_time: Arc::new(Instant::now()),
        };
        let served = api::start_api_server(listener, state, cancel.child_token()).await;

        shutdown_gracefully(cancel, vec![reconcile_task, logging_task]).await;
        log_reconcile_status(&stats);
        log_probe_error_statistics(&stats);

        served
    }
}
