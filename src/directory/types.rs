//! Directory data model.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error_handling::ProbeError;
use crate::geo::GeoPoint;

/// A registered server's directory record.
///
/// `id` is assigned by the store on insertion and never changes. `city`,
/// `state` and `last_updated_at` stay `None` until the first successful probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerEntry {
    pub id: i64,
    pub ip: String,
    pub location: Option<GeoPoint>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl ServerEntry {
    /// Whether this entry needs a fresh probe at `now`.
    ///
    /// Stale iff `city` is absent, it was never probed successfully, or the
    /// last success is older than `now - window`. The store's stale query
    /// encodes the same predicate.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match (&self.city, self.last_updated_at) {
            (Some(_), Some(updated)) => updated < freshness_cutoff(now, window),
            _ => true,
        }
    }

    /// Whether the entry has an address a probe can be sent to.
    pub fn has_ip(&self) -> bool {
        !self.ip.trim().is_empty()
    }
}

/// `now - window`, saturating at the earliest representable instant.
pub fn freshness_cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|w| now.checked_sub_signed(w))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Self-description a TaxiDash server returns from `general_info.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerInfo {
    pub city: String,
    pub state: String,
    /// Present only when the server also reports its coordinates
    pub location: Option<GeoPoint>,
}

/// Outcome of one probe, correlated with the entry id captured at dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    Success(ServerInfo),
    Failure(ProbeError),
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success(_))
    }
}

/// Summary of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Probes dispatched
    pub attempted: usize,
    /// Probes that succeeded and were written back
    pub succeeded: usize,
    /// Probes that failed, plus successes whose write failed
    pub failed: usize,
    /// Stale entries without an ip, left untouched
    pub skipped: usize,
    /// The stale selection itself couldn't read the store
    pub store_unavailable: bool,
}

/// One row of a nearby query answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestServer {
    pub city: Option<String>,
    pub state: Option<String>,
    pub ip: String,
    pub distance_km: f64,
}
