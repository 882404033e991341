//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format, writing to stderr.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (with colors) and JSON formats for structured logging.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter overrides it.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=taxidash_registry=debug,sqlx=warn taxidash_registry
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);
    let mut builder = base_builder(level);
    apply_format(&mut builder, format);
    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

/// Initializes the logger to append to a file instead of stderr.
///
/// Colors are disabled since the output is not a terminal. The file is created
/// if missing and never truncated.
pub fn init_logger_to_file(
    level: LevelFilter,
    format: LogFormat,
    path: &Path,
) -> Result<(), InitializationError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            InitializationError::LoggerSetupError(format!(
                "Failed to open log file {}: {e}",
                path.display()
            ))
        })?;

    colored::control::set_override(false);
    let mut builder = base_builder(level);
    apply_format(&mut builder, format);
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

fn base_builder(level: LevelFilter) -> env_logger::Builder {
    // Read from RUST_LOG first, then override with the configured level
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Info);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("taxidash_registry", level);
    builder
}

fn apply_format(builder: &mut env_logger::Builder, format: LogFormat) {
    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_plain_format() {
        // env_logger can only be initialized once per process; either outcome is fine
        let result = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_init_logger_json_format() {
        let result = init_logger_with(LevelFilter::Info, LogFormat::Json);
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_init_logger_to_file_creates_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("registry.log");
        let _ = init_logger_to_file(LevelFilter::Info, LogFormat::Plain, &path);
        // The file is opened before the global logger is installed
        assert!(path.exists());
    }

    #[test]
    fn test_init_logger_to_file_bad_path() {
        let result = init_logger_to_file(
            LevelFilter::Info,
            LogFormat::Plain,
            Path::new("/nonexistent-dir/for/sure/registry.log"),
        );
        assert!(matches!(
            result,
            Err(InitializationError::LoggerSetupError(_))
        ));
    }
}
