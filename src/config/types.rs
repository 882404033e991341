//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_FRESHNESS_WINDOW_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_SEARCH_RADIUS_KM, DEFAULT_NEAREST_LIMIT, DEFAULT_PROBE_TIMEOUT_SECS,
    DEFAULT_RECONCILE_INTERVAL_SECS, DEFAULT_SELF_ADDRESS_URL, DEFAULT_USER_AGENT,
    MAX_NEAREST_LIMIT,
};
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Parsed from the command line (with environment fallbacks) by the binary, or
/// constructed programmatically by library users and tests.
///
/// # Examples
///
/// ```no_run
/// use taxidash_registry::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./servers.db"),
///     reconcile_interval_secs: 3600,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "taxidash_registry", version, about)]
pub struct Config {
    /// Database path (SQLite file)
    #[arg(long, env = "TAXIDASH_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Address the HTTP route layer listens on
    #[arg(long, env = "TAXIDASH_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Append log output to this file instead of stderr
    #[arg(long, env = "TAXIDASH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub probe_timeout_seconds: u64,

    /// Maximum concurrent probes within one reconciliation pass
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// How long a successful probe keeps an entry fresh, in seconds
    #[arg(long, default_value_t = DEFAULT_FRESHNESS_WINDOW_SECS)]
    pub freshness_window_secs: u64,

    /// Interval between reconciliation passes, in seconds
    #[arg(long, default_value_t = DEFAULT_RECONCILE_INTERVAL_SECS)]
    pub reconcile_interval_secs: u64,

    /// Maximum distance in kilometres a nearby query searches
    #[arg(long, default_value_t = DEFAULT_MAX_SEARCH_RADIUS_KM)]
    pub max_search_radius_km: f64,

    /// Number of servers a nearby query returns when the client doesn't ask for a limit
    #[arg(long, default_value_t = DEFAULT_NEAREST_LIMIT)]
    pub default_nearest_limit: usize,

    /// Plain-text IP discovery endpoint used to learn this host's public address
    #[arg(long, env = "TAXIDASH_SELF_ADDRESS_URL", default_value = DEFAULT_SELF_ADDRESS_URL)]
    pub self_address_url: String,

    /// Static public address of this host (skips discovery)
    #[arg(long, env = "TAXIDASH_SELF_ADDRESS")]
    pub self_address: Option<String>,

    /// Disable loopback rewriting entirely
    #[arg(long)]
    pub disable_self_address: bool,

    /// HTTP User-Agent header value for outbound requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Config {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    /// Rejects values the service would accept but then misbehave with.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if !(1..=MAX_NEAREST_LIMIT).contains(&self.default_nearest_limit) {
            return Err(InitializationError::InvalidConfig(format!(
                "default nearest limit must be between 1 and {MAX_NEAREST_LIMIT}, got {}",
                self.default_nearest_limit
            )));
        }
        if !self.max_search_radius_km.is_finite() || self.max_search_radius_km <= 0.0 {
            return Err(InitializationError::InvalidConfig(format!(
                "max search radius must be a positive number of kilometres, got {}",
                self.max_search_radius_km
            )));
        }
        if self.max_concurrency == 0 {
            return Err(InitializationError::InvalidConfig(
                "max concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            log_file: None,
            probe_timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
            max_search_radius_km: DEFAULT_MAX_SEARCH_RADIUS_KM,
            default_nearest_limit: DEFAULT_NEAREST_LIMIT,
            self_address_url: DEFAULT_SELF_ADDRESS_URL.to_string(),
            self_address: None,
            disable_self_address: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.freshness_window(), Duration::from_secs(604_800));
        assert_eq!(config.reconcile_interval(), Duration::from_secs(86_400));
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_concurrency, 30);
        assert_eq!(config.default_nearest_limit, 3);
        assert!(!config.disable_self_address);
        assert_eq!(config.db_path, PathBuf::from("./taxidash.db"));
    }

    #[test]
    fn test_parse_matches_default() {
        // Defaults declared on the clap attributes must agree with Default
        let parsed = Config::try_parse_from(["taxidash_registry"]).expect("parse defaults");
        let default = Config::default();
        assert_eq!(parsed.db_path, default.db_path);
        assert_eq!(parsed.freshness_window_secs, default.freshness_window_secs);
        assert_eq!(parsed.reconcile_interval_secs, default.reconcile_interval_secs);
        assert_eq!(parsed.max_search_radius_km, default.max_search_radius_km);
        assert_eq!(parsed.user_agent, default.user_agent);
    }

    #[test]
    fn test_window_and_interval_are_independent() {
        let config = Config::try_parse_from([
            "taxidash_registry",
            "--reconcile-interval-secs",
            "3600",
        ])
        .expect("parse");
        assert_eq!(config.reconcile_interval(), Duration::from_secs(3600));
        assert_eq!(config.freshness_window(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        let parsed = Config::try_parse_from(["taxidash_registry"]).expect("parse defaults");
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_nearest_limit() {
        for limit in [0, MAX_NEAREST_LIMIT + 1] {
            let config = Config {
                default_nearest_limit: limit,
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(InitializationError::InvalidConfig(_))),
                "limit {limit} accepted"
            );
        }
        let config = Config {
            default_nearest_limit: MAX_NEAREST_LIMIT,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_radius() {
        for radius in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            let config = Config {
                max_search_radius_km: radius,
                ..Config::default()
            };
            assert!(config.validate().is_err(), "radius {radius} accepted");
        }
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrency: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
