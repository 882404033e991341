//! Shared test helpers for storage and reconciliation tests.
//!
//! This module provides common utilities for database setup and test data creation.

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use chrono::{DateTime, Utc};
#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::directory::{ServerEntry, ServerInfo};
#[cfg(test)]
use crate::storage::{run_migrations, ServerStore};

/// Creates a test database pool with migrations applied.
/// Uses a single-connection in-memory database so every query sees the same data.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Creates a store over a fresh in-memory database.
#[cfg(test)]
pub async fn create_test_store() -> ServerStore {
    ServerStore::new(Arc::new(create_test_pool().await))
}

/// Registers an entry and marks it as successfully probed at `updated_at`.
#[cfg(test)]
pub async fn insert_probed_entry(
    store: &ServerStore,
    ip: &str,
    city: &str,
    state: &str,
    updated_at: DateTime<Utc>,
) -> ServerEntry {
    let entry = store
        .register(ip, None, updated_at)
        .await
        .expect("Failed to register test entry");
    let info = ServerInfo {
        city: city.to_string(),
        state: state.to_string(),
        location: None,
    };
    store
        .apply_server_info(entry.id, &info, updated_at)
        .await
        .expect("Failed to mark test entry as probed");
    store
        .get(entry.id)
        .await
        .expect("Failed to read test entry")
        .expect("Test entry vanished")
}
