//! Process-level helpers: periodic status logging and shutdown.

pub mod logging;
pub mod shutdown;

pub use logging::{log_probe_error_statistics, log_reconcile_status, spawn_status_logging};
pub use shutdown::{shutdown_gracefully, wait_for_ctrl_c};
