//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `taxidash_registry` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use taxidash_registry::initialization::{init_logger_to_file, init_logger_with};
use taxidash_registry::{run_service, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), falling back
    // to one next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    match &config.log_file {
        Some(path) => init_logger_to_file(log_level.into(), log_format, path)
            .with_context(|| format!("Failed to initialize logger at {}", path.display()))?,
        None => init_logger_with(log_level.into(), log_format)
            .context("Failed to initialize logger")?,
    }

    if let Err(e) = run_service(config).await {
        eprintln!("taxidash_registry error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
