//! Error type definitions.
//!
//! This module defines all error types used throughout the service and the
//! probe failure taxonomy tracked by the reconciliation statistics.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A configuration value outside the range the service can run with.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Error types for database operations.
///
/// Every variant is treated as the transient `StoreUnavailable` condition by
/// callers: logged, never fatal.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A partial update addressed an id that doesn't exist.
    #[error("No server entry with id {0}")]
    EntryNotFound(i64),
}

/// Failure categories for a single metadata probe.
///
/// A probe failure leaves the entry stale; it is retried on the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ProbeErrorType {
    /// The probe target couldn't be turned into a request URL
    InvalidTarget,
    /// The probe exceeded its timeout
    Timeout,
    /// TCP connection could not be established
    Connect,
    /// The target answered with a non-2xx status
    HttpStatus,
    /// Reading the response body failed
    Body,
    /// Body was not valid JSON
    Decode,
    /// JSON was valid but `city` or `state` was missing or empty
    MalformedPayload,
    /// Any other request error
    Request,
}

impl std::fmt::Display for ProbeErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProbeErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeErrorType::InvalidTarget => "invalid probe target",
            ProbeErrorType::Timeout => "probe timeout",
            ProbeErrorType::Connect => "connect error",
            ProbeErrorType::HttpStatus => "non-success HTTP status",
            ProbeErrorType::Body => "response body error",
            ProbeErrorType::Decode => "unparsable response body",
            ProbeErrorType::MalformedPayload => "malformed general_info payload",
            ProbeErrorType::Request => "request error",
        }
    }

    /// Machine-readable name for status output and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeErrorType::InvalidTarget => "invalid_target",
            ProbeErrorType::Timeout => "timeout",
            ProbeErrorType::Connect => "connect",
            ProbeErrorType::HttpStatus => "http_status",
            ProbeErrorType::Body => "body",
            ProbeErrorType::Decode => "decode",
            ProbeErrorType::MalformedPayload => "malformed_payload",
            ProbeErrorType::Request => "request",
        }
    }
}

/// Why a probe failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct ProbeError {
    pub kind: ProbeErrorType,
    pub detail: String,
}

impl ProbeError {
    pub fn new(kind: ProbeErrorType, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Failure to learn this host's public address.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Self-address discovery is disabled by configuration.
    #[error("self-address discovery is disabled")]
    Disabled,

    /// The discovery endpoint couldn't be reached or answered with an error.
    #[error("self-address request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The discovery endpoint answered with something that isn't an IP address.
    #[error("self-address response is not an IP address: {0:?}")]
    InvalidAddress(String),
}

/// Errors at the query boundary, before a request reaches the core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Need both a latitude and longitude to get a nearby server.")]
    MissingCoordinates,

    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),

    #[error("limit must be between 1 and {max}, got {got}")]
    LimitOutOfRange { got: usize, max: usize },

    #[error("Need a server name.")]
    MissingName,

    #[error("city must be between 1 and {max} characters")]
    InvalidCity { max: usize },

    #[error("state must be between 1 and {max} characters")]
    InvalidState { max: usize },

    #[error("ip must not be empty")]
    MissingIp,

    /// Query string or body that could not be decoded into the expected fields.
    #[error("{0}")]
    MalformedRequest(String),
}

/// Errors returned by the public query interface.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("directory store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),
}
