//! Query request structs and their validation.
//!
//! The route layer deserializes raw query strings into these structs; only the
//! validated forms ([`NearbyRequest`], [`NameFilter`], [`NewServer`]) reach the
//! directory core.

use serde::Deserialize;

use crate::config::{MAX_CITY_LENGTH, MAX_NEAREST_LIMIT, MAX_STATE_LENGTH};
use crate::error_handling::ValidationError;
use crate::geo::GeoPoint;

/// Raw nearby query: `?latitude=..&longitude=..[&limit=..]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub limit: Option<usize>,
}

/// A nearby query that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyRequest {
    pub point: GeoPoint,
    pub limit: usize,
}

impl NearbyQuery {
    /// Validates coordinates and limit; `default_limit` applies when no limit was given.
    pub fn validate(&self, default_limit: usize) -> Result<NearbyRequest, ValidationError> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(ValidationError::MissingCoordinates);
        };
        let point = GeoPoint::new(latitude, longitude)?;
        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 || limit > MAX_NEAREST_LIMIT {
            return Err(ValidationError::LimitOutOfRange {
                got: limit,
                max: MAX_NEAREST_LIMIT,
            });
        }
        Ok(NearbyRequest { point, limit })
    }
}

/// Raw by-name query: `?city=..&state=..`, either or both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameQuery {
    pub city: Option<String>,
    pub state: Option<String>,
}

/// A by-name filter with at least one field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    city: Option<String>,
    state: Option<String>,
}

impl NameFilter {
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

impl NameQuery {
    pub fn validate(&self) -> Result<NameFilter, ValidationError> {
        if self.city.is_none() && self.state.is_none() {
            return Err(ValidationError::MissingName);
        }
        if let Some(city) = &self.city {
            if !within_length(city, MAX_CITY_LENGTH) {
                return Err(ValidationError::InvalidCity {
                    max: MAX_CITY_LENGTH,
                });
            }
        }
        if let Some(state) = &self.state {
            if !within_length(state, MAX_STATE_LENGTH) {
                return Err(ValidationError::InvalidState {
                    max: MAX_STATE_LENGTH,
                });
            }
        }
        Ok(NameFilter {
            city: self.city.clone(),
            state: self.state.clone(),
        })
    }
}

fn within_length(value: &str, max: usize) -> bool {
    let len = value.chars().count();
    (1..=max).contains(&len)
}

/// Registration body: the address a server is reachable on and where it is.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub ip: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A registration that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServer {
    pub ip: String,
    pub location: GeoPoint,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<NewServer, ValidationError> {
        let ip = self.ip.trim();
        if ip.is_empty() {
            return Err(ValidationError::MissingIp);
        }
        Ok(NewServer {
            ip: ip.to_string(),
            location: GeoPoint::new(self.latitude, self.longitude)?,
        })
    }
}
