//! Nearest-server resolution.

use crate::config::DEFAULT_NEAREST_LIMIT;
use crate::directory::NearestServer;
use crate::error_handling::DatabaseError;
use crate::geo::GeoPoint;
use crate::storage::ServerStore;

/// Answers "which registered servers are closest to this point".
///
/// Searches never reach beyond `max_radius_km`; a point with nothing inside
/// that radius gets an empty answer rather than a far-away server.
#[derive(Clone)]
pub struct NearestServerResolver {
    store: ServerStore,
    max_radius_km: f64,
}

impl NearestServerResolver {
    pub fn new(store: ServerStore, max_radius_km: f64) -> Self {
        Self {
            store,
            max_radius_km,
        }
    }

    pub fn max_radius_km(&self) -> f64 {
        self.max_radius_km
    }

    /// Up to `limit` servers ordered by increasing distance from `point`.
    ///
    /// The point is assumed valid; range checks happen when it is constructed.
    pub async fn nearest(
        &self,
        point: GeoPoint,
        limit: usize,
    ) -> Result<Vec<NearestServer>, DatabaseError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut found = self.store.find_near(point, self.max_radius_km).await?;
        found.truncate(limit);
        Ok(found
            .into_iter()
            .map(|(entry, distance_km)| NearestServer {
                city: entry.city,
                state: entry.state,
                ip: entry.ip,
                distance_km,
            })
            .collect())
    }

    /// [`nearest`](Self::nearest) with the default limit.
    pub async fn nearest_default(
        &self,
        point: GeoPoint,
    ) -> Result<Vec<NearestServer>, DatabaseError> {
        self.nearest(point, DEFAULT_NEAREST_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_SEARCH_RADIUS_KM;
    use crate::directory::ServerInfo;
    use crate::storage::test_helpers::create_test_store;
    use chrono::Utc;

    async fn add(store: &ServerStore, ip: &str, lat: f64, lon: f64, city: &str, state: &str) {
        let entry = store
            .register(ip, Some(GeoPoint::new(lat, lon).unwrap()), Utc::now())
            .await
            .unwrap();
        store
            .apply_server_info(
                entry.id,
                &ServerInfo {
                    city: city.to_string(),
                    state: state.to_string(),
                    location: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_directory_yields_empty_result() {
        let resolver = NearestServerResolver::new(create_test_store().await, 5000.0);
        let point = GeoPoint::new(36.16, -86.78).unwrap();
        assert!(resolver.nearest_default(point).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nearest_orders_by_distance_and_truncates() {
        let store = create_test_store().await;
        add(&store, "10.0.0.3", 34.05, -118.24, "Los Angeles", "CA").await;
        add(&store, "10.0.0.2", 40.71, -74.00, "New York", "NY").await;
        add(&store, "10.0.0.1", 36.16, -86.78, "Nashville", "TN").await;
        add(&store, "10.0.0.4", 35.15, -90.05, "Memphis", "TN").await;

        let resolver = NearestServerResolver::new(store, DEFAULT_MAX_SEARCH_RADIUS_KM);
        let point = GeoPoint::new(36.12, -86.67).unwrap();

        let found = resolver.nearest(point, 3).await.unwrap();
        assert_eq!(found.len(), 3);
        let cities: Vec<_> = found.iter().map(|s| s.city.as_deref().unwrap()).collect();
        assert_eq!(cities, ["Nashville", "Memphis", "New York"]);
        assert!(found.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

        let single = resolver.nearest(point, 1).await.unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].ip, "10.0.0.1");
        assert_eq!(single[0].state.as_deref(), Some("TN"));
    }

    #[tokio::test]
    async fn test_three_city_scenario() {
        let store = create_test_store().await;
        add(&store, "10.0.0.1", 36.17, -86.78, "Nashville", "TN").await;
        add(&store, "10.0.0.2", 40.71, -74.00, "New York", "NY").await;
        add(&store, "10.0.0.3", 34.05, -118.24, "Los Angeles", "CA").await;

        let resolver = NearestServerResolver::new(store, DEFAULT_MAX_SEARCH_RADIUS_KM);
        let found = resolver
            .nearest(GeoPoint::new(36.12, -86.67).unwrap(), 3)
            .await
            .unwrap();
        let cities: Vec<_> = found.iter().map(|s| s.city.as_deref().unwrap()).collect();
        assert_eq!(cities, ["Nashville", "New York", "Los Angeles"]);
    }

    #[tokio::test]
    async fn test_radius_excludes_far_servers() {
        let store = create_test_store().await;
        add(&store, "10.0.0.3", 34.05, -118.24, "Los Angeles", "CA").await;

        let resolver = NearestServerResolver::new(store, 500.0);
        let point = GeoPoint::new(36.12, -86.67).unwrap();
        assert!(resolver.nearest(point, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unprobed_entries_are_resolvable() {
        let store = create_test_store().await;
        store
            .register("10.0.0.9", Some(GeoPoint::new(36.16, -86.78).unwrap()), Utc::now())
            .await
            .unwrap();

        let resolver = NearestServerResolver::new(store, 100.0);
        let found = resolver
            .nearest(GeoPoint::new(36.12, -86.67).unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].city, None);
    }

    #[tokio::test]
    async fn test_servers_near_radius_edge_are_returned() {
        let store = create_test_store().await;
        // North-east of Nashville, beyond the parallel-based longitude span
        add(&store, "10.0.1.1", 56.4, -28.67, "Edge East", "XX").await;
        let resolver = NearestServerResolver::new(store, 5000.0);
        let found = resolver
            .nearest(GeoPoint::new(36.12, -86.67).unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!((4800.0..5000.0).contains(&found[0].distance_km));

        let store = create_test_store().await;
        // Due north, just inside the radius
        add(&store, "10.0.1.2", 44.95, 0.0, "Edge North", "XX").await;
        let resolver = NearestServerResolver::new(store, 5000.0);
        let found = resolver
            .nearest(GeoPoint::new(0.0, 0.0).unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].distance_km < 5000.0);
    }

    #[tokio::test]
    async fn test_diagonal_server_near_radius_is_returned() {
        let store = create_test_store().await;
        // About 4900 km on a 45 degree bearing from Nashville
        add(&store, "10.0.1.3", 55.1668, -27.2419, "Diagonal NE", "XX").await;
        // About 4900 km on a 135 degree bearing from (0, 0)
        add(&store, "10.0.1.4", -29.4583, 34.3892, "Diagonal SE", "XX").await;

        let resolver = NearestServerResolver::new(store.clone(), 5000.0);
        let found = resolver
            .nearest(GeoPoint::new(36.12, -86.67).unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ip, "10.0.1.3");
        assert!((4890.0..4910.0).contains(&found[0].distance_km));

        let found = resolver
            .nearest(GeoPoint::new(0.0, 0.0).unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ip, "10.0.1.4");
    }
}
