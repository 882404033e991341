//! Directory query handlers.
//!
//! Response bodies keep the shapes existing TaxiDash clients parse: a JSON list
//! of `{city: ip}` objects for nearby lookups and space-separated plain text
//! for the by-name listings.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::info;
use serde_json::{Map, Value};

use super::super::types::{ApiError, ApiState};
use crate::directory::{NameQuery, NearbyQuery, NearestServer, RegisterRequest, ServerEntry};

pub async fn welcome_handler() -> &'static str {
    "Welcome to the TaxiDash Registration Server."
}

/// `GET /getNearbyTaxiDash?latitude=..&longitude=..[&limit=..]`
pub async fn nearby_handler(
    State(state): State<ApiState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let Query(query) = query?;
    info!(
        "Request for TaxiDash server near {:?}, {:?}",
        query.latitude, query.longitude
    );
    let found = state.directory.nearby(&query).await?;
    Ok(Json(found.iter().map(nearby_item).collect()))
}

fn nearby_item(server: &NearestServer) -> Map<String, Value> {
    let mut item = Map::new();
    item.insert(
        server.city.clone().unwrap_or_default(),
        Value::String(server.ip.clone()),
    );
    item
}

/// `GET /getTaxiDashByName?city=..&state=..`: matching addresses, space separated.
pub async fn by_name_handler(
    State(state): State<ApiState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(query) = query?;
    info!(
        "Searching for TaxiDash server for {:?}, {:?}",
        query.city, query.state
    );
    let found = state.directory.by_name(&query).await?;
    Ok(space_separated(found.iter().map(|entry| entry.ip.clone())))
}

/// `GET /getAllTaxiDashNames`: every named server as `city,state`, space separated.
pub async fn all_names_handler(State(state): State<ApiState>) -> Result<String, ApiError> {
    let all = state.directory.list_all().await?;
    Ok(space_separated(all.iter().filter_map(name_of)))
}

fn name_of(entry: &ServerEntry) -> Option<String> {
    match (&entry.city, &entry.state) {
        (Some(city), Some(state)) => Some(format!("{city},{state}")),
        _ => None,
    }
}

fn space_separated(items: impl Iterator<Item = String>) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&item);
        out.push(' ');
    }
    out
}

/// `POST /servers` with `{ip, latitude, longitude}`.
pub async fn register_handler(
    State(state): State<ApiState>,
    request: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request?;
    let entry = state.directory.register(&request).await?;
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}
