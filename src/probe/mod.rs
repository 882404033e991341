//! Metadata probes against registered servers.
//!
//! A probe fetches `general_info.json` from one entry's address and turns the
//! answer into a [`ProbeResult`]. Probes share nothing mutable, so a pass can
//! run as many of them at once as its semaphore allows.

mod payload;
mod target;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::MAX_GENERAL_INFO_BODY_SIZE;
use crate::directory::{ProbeResult, ServerEntry};
use crate::error_handling::{ProbeError, ProbeErrorType};

pub use payload::parse_general_info;
pub use target::{general_info_url, probe_target};

/// Issues metadata probes.
///
/// Cloning is cheap and every clone shares the same HTTP client.
#[derive(Clone)]
pub struct InfoProber {
    client: Arc<reqwest::Client>,
    timeout: Duration,
}

impl InfoProber {
    pub fn new(client: Arc<reqwest::Client>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes `entry` once, without retrying.
    ///
    /// The loopback rewrite only affects the request target; `entry` itself is
    /// never modified.
    pub async fn probe(&self, entry: &ServerEntry, self_address: Option<IpAddr>) -> ProbeResult {
        let target = probe_target(&entry.ip, self_address);
        let url = match general_info_url(&target) {
            Ok(url) => url,
            Err(e) => return ProbeResult::Failure(e),
        };

        debug!(
            "Probing entry {} ({}) at {}",
            entry.id, entry.ip, url
        );

        match tokio::time::timeout(self.timeout, self.fetch(url)).await {
            Ok(Ok(body)) => match parse_general_info(&body) {
                Ok(info) => ProbeResult::Success(info),
                Err(e) => ProbeResult::Failure(e),
            },
            Ok(Err(e)) => ProbeResult::Failure(e),
            Err(_) => ProbeResult::Failure(ProbeError::new(
                ProbeErrorType::Timeout,
                format!("no answer within {}s", self.timeout.as_secs_f64()),
            )),
        }
    }

    async fn fetch(&self, url: reqwest::Url) -> Result<Vec<u8>, ProbeError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        if let Some(length) = response.content_length() {
            if length > MAX_GENERAL_INFO_BODY_SIZE as u64 {
                return Err(body_too_large());
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_GENERAL_INFO_BODY_SIZE {
                return Err(body_too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn body_too_large() -> ProbeError {
    ProbeError::new(
        ProbeErrorType::Body,
        format!("general_info body exceeds {} bytes", MAX_GENERAL_INFO_BODY_SIZE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry_for(server: &MockServer) -> ServerEntry {
        ServerEntry {
            id: 7,
            ip: server.address().to_string(),
            location: None,
            city: None,
            state: None,
            last_updated_at: None,
        }
    }

    fn prober(timeout: Duration) -> InfoProber {
        InfoProber::new(Arc::new(reqwest::Client::new()), timeout)
    }

    #[tokio::test]
    async fn test_probe_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/general_info.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"city": "Nashville", "state": "TN"})),
            )
            .mount(&server)
            .await;

        let result = prober(Duration::from_secs(5))
            .probe(&entry_for(&server), None)
            .await;
        match result {
            ProbeResult::Success(info) => {
                assert_eq!(info.city, "Nashville");
                assert_eq!(info.state, "TN");
            }
            ProbeResult::Failure(e) => panic!("expected success, got {e}"),
        }
    }

    #[tokio::test]
    async fn test_probe_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = prober(Duration::from_secs(5))
            .probe(&entry_for(&server), None)
            .await;
        assert!(matches!(
            result,
            ProbeResult::Failure(ProbeError { kind: ProbeErrorType::HttpStatus, .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"city": "Nashville"})),
            )
            .mount(&server)
            .await;

        let result = prober(Duration::from_secs(5))
            .probe(&entry_for(&server), None)
            .await;
        assert!(matches!(
            result,
            ProbeResult::Failure(ProbeError { kind: ProbeErrorType::MalformedPayload, .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"city": "Nashville", "state": "TN"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = prober(Duration::from_millis(200))
            .probe(&entry_for(&server), None)
            .await;
        assert!(matches!(
            result,
            ProbeResult::Failure(ProbeError { kind: ProbeErrorType::Timeout, .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_rewrites_own_address_to_loopback() {
        // The entry claims a public address; with that address as our own the
        // probe must land on the loopback mock server instead
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/general_info.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"city": "Nashville", "state": "TN"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let entry = ServerEntry {
            ip: format!("203.0.113.5:{}", server.address().port()),
            ..entry_for(&server)
        };
        let result = prober(Duration::from_secs(5))
            .probe(&entry, Some("203.0.113.5".parse().unwrap()))
            .await;
        assert!(result.is_success());
        assert_eq!(entry.ip, format!("203.0.113.5:{}", server.address().port()));
    }

    #[tokio::test]
    async fn test_probe_empty_ip_is_invalid_target() {
        let entry = ServerEntry {
            id: 1,
            ip: String::new(),
            location: None,
            city: None,
            state: None,
            last_updated_at: None,
        };
        let result = prober(Duration::from_secs(1)).probe(&entry, None).await;
        assert!(matches!(
            result,
            ProbeResult::Failure(ProbeError { kind: ProbeErrorType::InvalidTarget, .. })
        ));
    }
}
