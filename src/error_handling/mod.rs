//! Error handling and reconciliation statistics.
//!
//! This module provides:
//! - Error type definitions for initialization, storage, probing, self-address
//!   lookup and query validation
//! - The probe failure taxonomy and its categorization from `reqwest` errors
//! - Thread-safe reconciliation counters
//!
//! None of these errors terminate the process: the worst outcome of any
//! failure path is a stale entry or an empty/error query result.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, update_probe_error_stats};
pub use stats::ReconcileStats;
pub use types::{
    DatabaseError, DirectoryError, InitializationError, LookupError, ProbeError, ProbeErrorType,
    ValidationError,
};
