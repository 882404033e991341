//! Geographic coordinates and distances.

use serde::{Deserialize, Serialize};

use crate::error_handling::ValidationError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A validated coordinate: latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // Rounding can push `a` a hair above 1 for antipodal points
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }

    /// Smallest latitude/longitude box containing every point within `radius_km`.
    ///
    /// Both spans come from the angular radius `d = radius_km / EARTH_RADIUS_KM`
    /// so the box agrees with [`distance_km`](Self::distance_km). The widest
    /// longitude offset of the cap is `asin(sin d / cos lat)`, reached north or
    /// south of the centre rather than on its parallel.
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let d = radius_km / EARTH_RADIUS_KM;
        let dlat = d.to_degrees();
        let min_lat = self.latitude - dlat;
        let max_lat = self.latitude + dlat;

        // A cap holding a pole, or reaching across the antimeridian, spans every longitude
        let sin_d = d.sin();
        let cos_lat = self.latitude.to_radians().cos();
        let longitude = if min_lat <= -90.0 || max_lat >= 90.0 || sin_d >= cos_lat {
            None
        } else {
            let dlon = (sin_d / cos_lat).asin().to_degrees();
            let min_lon = self.longitude - dlon;
            let max_lon = self.longitude + dlon;
            if min_lon < -180.0 || max_lon > 180.0 {
                None
            } else {
                Some((min_lon, max_lon))
            }
        };

        BoundingBox {
            min_lat: min_lat.max(-90.0),
            max_lat: max_lat.min(90.0),
            longitude,
        }
    }
}

/// Prefilter box for radius searches.
///
/// `longitude` is `None` when the box wraps the antimeridian or covers a pole;
/// the caller then filters on latitude only and relies on the exact distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub longitude: Option<(f64, f64)>,
}
