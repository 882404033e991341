//! Server entry persistence.
//!
//! The `servers` table is the directory: filter queries for stale selection and
//! by-name lookups, a radius query for nearest-server resolution, and partial
//! updates for the reconciliation write-back.

use chrono::{DateTime, Utc};
use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::directory::{NameFilter, ServerEntry, ServerInfo};
use crate::error_handling::DatabaseError;
use crate::geo::GeoPoint;
use crate::storage::DbPool;

const ENTRY_COLUMNS: &str = "id, ip, latitude, longitude, city, state, last_updated_ms";

/// Handle to the directory table.
///
/// Cheap to clone; every clone shares the same pool.
#[derive(Clone)]
pub struct ServerStore {
    pool: DbPool,
}

impl ServerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.pool.as_ref()
    }

    /// Inserts a new entry and returns it with its store-assigned id.
    pub async fn register(
        &self,
        ip: &str,
        location: Option<GeoPoint>,
        registered_at: DateTime<Utc>,
    ) -> Result<ServerEntry, DatabaseError> {
        let id: i64 = sqlx::query(
            "INSERT INTO servers (ip, latitude, longitude, registered_at_ms)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(ip)
        .bind(location.map(|p| p.latitude))
        .bind(location.map(|p| p.longitude))
        .bind(registered_at.timestamp_millis())
        .fetch_one(self.pool())
        .await?
        .try_get(0)?;

        debug!("Registered server {} as entry {}", ip, id);
        Ok(ServerEntry {
            id,
            ip: ip.to_string(),
            location,
            city: None,
            state: None,
            last_updated_at: None,
        })
    }

    /// Fetches one entry by id.
    pub async fn get(&self, id: i64) -> Result<Option<ServerEntry>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {ENTRY_COLUMNS} FROM servers WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(entry_from_row).transpose()
    }

    /// Entries with no city, never probed, or last probed before `cutoff`.
    pub async fn find_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<ServerEntry>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM servers
             WHERE city IS NULL OR last_updated_ms IS NULL OR last_updated_ms < ?"
        ))
        .bind(cutoff.timestamp_millis())
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(entry_from_row).collect()
    }

    /// Entries within `max_distance_km` of `point`, nearest first, with their distance.
    ///
    /// A bounding box narrows the scan in SQL; the exact great-circle distance
    /// decides membership and order. Entries without a location never match.
    pub async fn find_near(
        &self,
        point: GeoPoint,
        max_distance_km: f64,
    ) -> Result<Vec<(ServerEntry, f64)>, DatabaseError> {
        let bbox = point.bounding_box(max_distance_km);

        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {ENTRY_COLUMNS} FROM servers
             WHERE latitude IS NOT NULL AND longitude IS NOT NULL AND latitude BETWEEN "
        ));
        query_builder.push_bind(bbox.min_lat);
        query_builder.push(" AND ");
        query_builder.push_bind(bbox.max_lat);
        if let Some((min_lon, max_lon)) = bbox.longitude {
            query_builder.push(" AND longitude BETWEEN ");
            query_builder.push_bind(min_lon);
            query_builder.push(" AND ");
            query_builder.push_bind(max_lon);
        }

        let rows = query_builder.build().fetch_all(self.pool()).await?;

        let mut found = Vec::with_capacity(rows.len());
        for row in &rows {
            let entry = entry_from_row(row)?;
            let Some(location) = entry.location else {
                continue;
            };
            let distance = point.distance_km(&location);
            if distance <= max_distance_km {
                found.push((entry, distance));
            }
        }
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.id.cmp(&b.0.id)));
        Ok(found)
    }

    /// Entries matching every field set in `filter`.
    pub async fn find_by_name(&self, filter: &NameFilter) -> Result<Vec<ServerEntry>, DatabaseError> {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM servers WHERE 1 = 1"));
        if let Some(city) = filter.city() {
            query_builder.push(" AND city = ");
            query_builder.push_bind(city);
        }
        if let Some(state) = filter.state() {
            query_builder.push(" AND state = ");
            query_builder.push_bind(state);
        }
        query_builder.push(" ORDER BY id");

        let rows = query_builder.build().fetch_all(self.pool()).await?;
        rows.iter().map(entry_from_row).collect()
    }

    /// Every registered entry, in registration order.
    pub async fn list_all(&self) -> Result<Vec<ServerEntry>, DatabaseError> {
        let rows = sqlx::query(&format!("SELECT {ENTRY_COLUMNS} FROM servers ORDER BY id"))
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(entry_from_row).collect()
    }

    /// Partial update after a successful probe.
    ///
    /// Sets `city`, `state` and `last_updated_ms`, plus the location when the
    /// probe reported one. `ip` and `registered_at_ms` are never touched.
    pub async fn apply_server_info(
        &self,
        id: i64,
        info: &ServerInfo,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE servers
             SET city = ?, state = ?, last_updated_ms = ?,
                 latitude = COALESCE(?, latitude),
                 longitude = COALESCE(?, longitude)
             WHERE id = ?",
        )
        .bind(&info.city)
        .bind(&info.state)
        .bind(updated_at.timestamp_millis())
        .bind(info.location.map(|p| p.latitude))
        .bind(info.location.map(|p| p.longitude))
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::EntryNotFound(id));
        }
        Ok(())
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<ServerEntry, DatabaseError> {
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let location = match (latitude, longitude) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok(),
        _ => None,
    };
    let last_updated_ms: Option<i64> = row.try_get("last_updated_ms")?;

    Ok(ServerEntry {
        id: row.try_get("id")?,
        ip: row.try_get("ip")?,
        location,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        last_updated_at: last_updated_ms.and_then(DateTime::from_timestamp_millis),
    })
}
