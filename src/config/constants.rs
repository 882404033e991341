//! Configuration constants.
//!
//! Defaults for the reconciliation engine, the nearest-server resolver and the
//! route layer. Every value here can be overridden through [`Config`](super::Config).

/// Default SQLite database path
pub const DB_PATH: &str = "./taxidash.db";

/// Default address the route layer binds to (the original server listened on 0.0.0.0:8888)
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8888";

/// Well-known path every TaxiDash server exposes its self-description on
pub const GENERAL_INFO_PATH: &str = "/general_info.json";

// Reconciliation timing
/// How long a successful probe stays fresh (1 week)
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;
/// Interval between reconciliation passes (daily)
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 24 * 60 * 60;
/// Per-probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
/// TCP connect timeout for probes, kept below the probe timeout so dead hosts fail fast
pub const PROBE_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Maximum probes in flight within one pass (semaphore limit)
pub const DEFAULT_MAX_CONCURRENCY: usize = 30;
/// Maximum accepted `general_info.json` body size (64KB)
pub const MAX_GENERAL_INFO_BODY_SIZE: usize = 64 * 1024;

// Nearest-server resolution
/// Maximum search radius for nearby queries in kilometres.
///
/// 5000 km spans the continental United States from any point inside it, so a
/// client anywhere in the service area sees every candidate without the query
/// degrading into "return any registered server".
pub const DEFAULT_MAX_SEARCH_RADIUS_KM: f64 = 5000.0;
/// Number of servers returned by a nearby query when the caller doesn't say
pub const DEFAULT_NEAREST_LIMIT: usize = 3;
/// Upper bound a caller may ask for in one nearby query
pub const MAX_NEAREST_LIMIT: usize = 50;

// Query validation limits (same bounds the original route schema enforced)
pub const MAX_CITY_LENGTH: usize = 100;
pub const MAX_STATE_LENGTH: usize = 2;

// Self-address discovery
/// Plain-text IP discovery endpoint used when no static self address is configured
pub const DEFAULT_SELF_ADDRESS_URL: &str = "https://api.ipify.org";
/// Timeout for the self-address lookup in seconds
pub const SELF_ADDRESS_TIMEOUT_SECS: u64 = 5;

/// Loopback host substituted for this process's own public IPv4 address
pub const LOOPBACK_V4: &str = "127.0.0.1";
/// Loopback host substituted for this process's own public IPv6 address
pub const LOOPBACK_V6: &str = "::1";

/// Default User-Agent for probes and self-address lookups
pub const DEFAULT_USER_AGENT: &str = concat!("taxidash-registry/", env!("CARGO_PKG_VERSION"));

/// Status logging interval in seconds while the service is running
pub const STATUS_LOGGING_INTERVAL_SECS: u64 = 300;
