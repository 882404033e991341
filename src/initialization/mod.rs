//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (stderr or file)
//! - HTTP clients for probes and self-address discovery
//! - The probe concurrency semaphore
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::{init_client, init_lookup_client};
pub use logger::{init_logger_to_file, init_logger_with};

/// Initializes a semaphore for controlling probe concurrency.
///
/// A zero count would deadlock every pass, so it is raised to one.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_semaphore_never_zero() {
        assert_eq!(init_semaphore(0).available_permits(), 1);
        assert_eq!(init_semaphore(30).available_permits(), 30);
    }

    #[test]
    fn test_init_clients_with_defaults() {
        let config = crate::config::Config::default();
        assert!(init_client(&config).is_ok());
        assert!(init_lookup_client(&config).is_ok());
    }
}
