//! HTTP client initialization.
//!
//! One client is shared by every probe of every pass; reqwest pools connections
//! internally so cloning the `Arc` is all a task needs.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, PROBE_CONNECT_TIMEOUT_SECS, SELF_ADDRESS_TIMEOUT_SECS};

/// Initializes the HTTP client used for metadata probes.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from config
/// - Overall timeout from `probe_timeout_seconds`
/// - A shorter connect timeout so unreachable hosts fail fast
/// - Redirects disabled: a server's self-description lives at a fixed path
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let timeout = Duration::from_secs(config.probe_timeout_seconds);
    let connect_timeout = Duration::from_secs(PROBE_CONNECT_TIMEOUT_SECS).min(timeout);
    let client = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client used for self-address discovery.
///
/// Discovery services commonly redirect to a canonical host, so redirects are
/// followed here.
pub fn init_lookup_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(SELF_ADDRESS_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
