//! The directory: its data model and the query interface the route layer calls.

mod query;
mod types;

use chrono::Utc;
use log::info;

use crate::error_handling::DirectoryError;
use crate::nearest::NearestServerResolver;
use crate::storage::ServerStore;

pub use query::{
    NameFilter, NameQuery, NearbyQuery, NearbyRequest, NewServer, RegisterRequest,
};
pub use types::{
    freshness_cutoff, NearestServer, PassSummary, ProbeResult, ServerEntry, ServerInfo,
};

/// Public query interface over the directory.
///
/// Requests are validated here before they reach the resolver or the store,
/// so the route layer only has to map errors to status codes.
#[derive(Clone)]
pub struct Directory {
    store: ServerStore,
    resolver: NearestServerResolver,
    default_limit: usize,
}

impl Directory {
    pub fn new(store: ServerStore, resolver: NearestServerResolver, default_limit: usize) -> Self {
        Self {
            store,
            resolver,
            default_limit,
        }
    }

    /// Nearest servers to `(latitude, longitude)`, closest first.
    pub async fn resolve_nearest(
        &self,
        latitude: f64,
        longitude: f64,
        limit: Option<usize>,
    ) -> Result<Vec<NearestServer>, DirectoryError> {
        self.nearby(&NearbyQuery {
            latitude: Some(latitude),
            longitude: Some(longitude),
            limit,
        })
        .await
    }

    pub async fn nearby(&self, query: &NearbyQuery) -> Result<Vec<NearestServer>, DirectoryError> {
        let request = query.validate(self.default_limit)?;
        Ok(self.resolver.nearest(request.point, request.limit).await?)
    }

    /// Servers whose city and/or state match exactly.
    pub async fn resolve_by_name(
        &self,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<ServerEntry>, DirectoryError> {
        self.by_name(&NameQuery {
            city: city.map(str::to_string),
            state: state.map(str::to_string),
        })
        .await
    }

    pub async fn by_name(&self, query: &NameQuery) -> Result<Vec<ServerEntry>, DirectoryError> {
        let filter = query.validate()?;
        Ok(self.store.find_by_name(&filter).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<ServerEntry>, DirectoryError> {
        Ok(self.store.list_all().await?)
    }

    /// Adds a server. It stays unnamed until a reconciliation pass probes it.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ServerEntry, DirectoryError> {
        let new_server = request.validate()?;
        let entry = self
            .store
            .register(&new_server.ip, Some(new_server.location), Utc::now())
            .await?;
        info!("Registered server {} as entry {}", entry.ip, entry.id);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ValidationError;
    use crate::storage::test_helpers::{create_test_store, insert_probed_entry};

    async fn directory() -> Directory {
        let store = create_test_store().await;
        Directory::new(store.clone(), NearestServerResolver::new(store, 5000.0), 3)
    }

    #[tokio::test]
    async fn test_register_then_resolve_nearest() {
        let directory = directory().await;
        let entry = directory
            .register(&RegisterRequest {
                ip: " 10.0.0.1 ".to_string(),
                latitude: 36.16,
                longitude: -86.78,
            })
            .await
            .unwrap();
        assert_eq!(entry.ip, "10.0.0.1");

        let found = directory.resolve_nearest(36.12, -86.67, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected_before_the_store() {
        let directory = directory().await;
        assert!(matches!(
            directory.resolve_nearest(91.0, 0.0, None).await,
            Err(DirectoryError::Validation(ValidationError::LatitudeOutOfRange(_)))
        ));
        assert!(matches!(
            directory.nearby(&NearbyQuery::default()).await,
            Err(DirectoryError::Validation(ValidationError::MissingCoordinates))
        ));
        assert!(matches!(
            directory.resolve_by_name(None, None).await,
            Err(DirectoryError::Validation(ValidationError::MissingName))
        ));
        assert!(matches!(
            directory.resolve_by_name(None, Some("TNX")).await,
            Err(DirectoryError::Validation(ValidationError::InvalidState { .. }))
        ));
    }

    #[tokio::test]
    async fn test_resolve_by_name_and_list_all() {
        let store = create_test_store().await;
        let directory = Directory::new(
            store.clone(),
            NearestServerResolver::new(store.clone(), 5000.0),
            3,
        );
        insert_probed_entry(&store, "10.0.0.1", "Nashville", "TN", Utc::now()).await;
        insert_probed_entry(&store, "10.0.0.2", "Memphis", "TN", Utc::now()).await;
        insert_probed_entry(&store, "10.0.0.3", "Austin", "TX", Utc::now()).await;

        let tennessee = directory.resolve_by_name(None, Some("TN")).await.unwrap();
        assert_eq!(tennessee.len(), 2);

        let nashville = directory
            .resolve_by_name(Some("Nashville"), Some("TN"))
            .await
            .unwrap();
        assert_eq!(nashville.len(), 1);
        assert_eq!(nashville[0].ip, "10.0.0.1");

        assert_eq!(directory.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_unavailable() {
        let store = create_test_store().await;
        let directory = Directory::new(
            store.clone(),
            NearestServerResolver::new(store.clone(), 5000.0),
            3,
        );
        store.pool().close().await;
        assert!(matches!(
            directory.list_all().await,
            Err(DirectoryError::StoreUnavailable(_))
        ));
    }
}
