//! Discovery of this host's publicly visible address.
//!
//! The address is looked up once and cached. Probes only read the cache; the
//! scheduler triggers a lookup between passes while the address is still
//! unknown. A failed lookup leaves the cache as it was, which turns loopback
//! rewriting into a no-op until a later lookup succeeds.

use std::net::IpAddr;
use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error_handling::LookupError;

enum AddressSource {
    /// Ask an IP discovery endpoint
    Discover {
        client: Arc<reqwest::Client>,
        url: String,
    },
    /// Configured statically; never looked up
    Fixed(IpAddr),
    /// Loopback rewriting turned off
    Disabled,
}

/// Caches this process's externally visible address.
pub struct SelfAddressResolver {
    source: AddressSource,
    cached: RwLock<Option<IpAddr>>,
}

impl SelfAddressResolver {
    /// Resolver that learns the address from a plain-text or JSON discovery endpoint.
    pub fn discover(client: Arc<reqwest::Client>, url: impl Into<String>) -> Self {
        Self {
            source: AddressSource::Discover {
                client,
                url: url.into(),
            },
            cached: RwLock::new(None),
        }
    }

    /// Resolver with a known address.
    pub fn fixed(address: IpAddr) -> Self {
        Self {
            source: AddressSource::Fixed(address),
            cached: RwLock::new(Some(address)),
        }
    }

    /// Resolver that never knows an address.
    pub fn disabled() -> Self {
        Self {
            source: AddressSource::Disabled,
            cached: RwLock::new(None),
        }
    }

    /// Builds the resolver the configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::InvalidAddress` if a static address doesn't parse.
    pub fn from_config(
        config: &Config,
        lookup_client: Arc<reqwest::Client>,
    ) -> Result<Self, LookupError> {
        if config.disable_self_address {
            return Ok(Self::disabled());
        }
        match &config.self_address {
            Some(address) => Ok(Self::fixed(parse_address(address)?)),
            None => Ok(Self::discover(lookup_client, config.self_address_url.clone())),
        }
    }

    /// The cached address, if one is known. Never performs a lookup.
    pub async fn cached(&self) -> Option<IpAddr> {
        *self.cached.read().await
    }

    /// Returns the cached address, looking it up first if it isn't known yet.
    pub async fn resolve(&self) -> Result<IpAddr, LookupError> {
        if let Some(address) = self.cached().await {
            return Ok(address);
        }

        let mut cached = self.cached.write().await;
        // Another caller may have finished a lookup while we waited for the lock
        if let Some(address) = *cached {
            return Ok(address);
        }
        let address = self.lookup().await?;
        info!("Public address of this host: {}", address);
        *cached = Some(address);
        Ok(address)
    }

    /// Forces a new lookup. On failure the previous address stays cached.
    pub async fn refresh(&self) -> Result<IpAddr, LookupError> {
        let mut cached = self.cached.write().await;
        match self.lookup().await {
            Ok(address) => {
                if *cached != Some(address) {
                    info!("Public address of this host changed to {}", address);
                }
                *cached = Some(address);
                Ok(address)
            }
            Err(LookupError::Disabled) => Err(LookupError::Disabled),
            Err(e) => {
                warn!("Self-address refresh failed, keeping {:?}: {}", *cached, e);
                Err(e)
            }
        }
    }

    async fn lookup(&self) -> Result<IpAddr, LookupError> {
        match &self.source {
            AddressSource::Discover { client, url } => {
                let body = client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                parse_lookup_body(&body)
            }
            AddressSource::Fixed(address) => Ok(*address),
            AddressSource::Disabled => Err(LookupError::Disabled),
        }
    }
}

#[derive(Deserialize)]
struct IpBody {
    ip: String,
}

/// Accepts a bare address, a JSON string, or a JSON object with an `ip` field.
fn parse_lookup_body(body: &str) -> Result<IpAddr, LookupError> {
    let trimmed = body.trim();
    if let Ok(address) = parse_address(trimmed) {
        return Ok(address);
    }
    if let Ok(text) = serde_json::from_str::<String>(trimmed) {
        return parse_address(&text);
    }
    if let Ok(IpBody { ip }) = serde_json::from_str::<IpBody>(trimmed) {
        return parse_address(&ip);
    }
    Err(LookupError::InvalidAddress(truncate(trimmed)))
}

fn parse_address(text: &str) -> Result<IpAddr, LookupError> {
    text.trim()
        .parse()
        .map_err(|_| LookupError::InvalidAddress(truncate(text)))
}

fn truncate(text: &str) -> String {
    text.chars().take(64).collect()
}
