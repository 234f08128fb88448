//! Address HTTP routes
//!
//! | Method | Path                 | Result                               |
//! |--------|----------------------|--------------------------------------|
//! | GET    | `/`                  | liveness text                        |
//! | GET    | `/addresses`         | all records, creation order          |
//! | POST   | `/address`           | create (also accepted at `/addresses`) |
//! | GET    | `/address/:id`       | one record plus decoded coordinates  |
//! | DELETE | `/address/:id`       | delete                               |
//! | GET    | `/addresses/markers` | records that carry coordinates       |

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use waypost_core::{AddressId, AddressRecord, Coordinates, Marker, NewAddress, StoreError};

use crate::error::{ApiError, MessageBody};
use crate::state::AppState;

/// Largest accepted request body
pub const BODY_LIMIT: usize = 16 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(health_handler))
        .route("/addresses", get(list_handler).post(create_handler))
        .route("/addresses/markers", get(markers_handler))
        .route("/address", post(create_handler))
        .route("/address/:id", get(get_handler).delete(delete_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create request body
///
/// Absent and `null` fields are treated as empty so validation can name
/// them. `coordinates` stands in for `details` when the latter is blank.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAddress {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl CreateAddress {
    fn into_new_address(self) -> NewAddress {
        let label = self.label.unwrap_or_default();
        let details = match (self.details, self.coordinates) {
            (Some(details), _) if !details.trim().is_empty() => details,
            (_, Some(coords)) => coords.to_details(),
            (details, None) => details.unwrap_or_default(),
        };
        NewAddress::new(label, details)
    }
}

/// A record with its coordinates decoded for the caller
#[derive(Debug, Serialize)]
pub struct AddressView {
    #[serde(flatten)]
    pub record: AddressRecord,
    pub coordinates: Option<Coordinates>,
}

async fn health_handler() -> &'static str {
    "Server is running"
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AddressRecord>>, ApiError> {
    let records = state.with_store(|store| store.list()).await?;
    Ok(Json(records))
}

async fn markers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Marker>>, ApiError> {
    let markers = state.with_store(|store| store.markers()).await?;
    Ok(Json(markers))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAddress>, JsonRejection>,
) -> Result<(StatusCode, Json<AddressRecord>), ApiError> {
    let Json(payload) = payload?;
    let new = payload.into_new_address();

    let record = state.with_store(move |store| store.create(new)).await?;

    info!(id = %record.id(), label = record.label(), "Saved address");
    if let Some(coords) = record.coordinates().filter(|c| !c.is_on_earth()) {
        warn!(id = %record.id(), ?coords, "Saved coordinates are outside WGS84 range");
    }
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<AddressView>, ApiError> {
    let id: AddressId = raw_id.parse()?;

    let record = state
        .with_store(move |store| store.get(id)?.ok_or(StoreError::NotFound(id)))
        .await?;

    let coordinates = record.coordinates();
    Ok(Json(AddressView {
        record,
        coordinates,
    }))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = raw_id.clone();
    state.with_store(move |store| store.delete_by_raw(&id)).await?;

    info!(id = %raw_id, "Deleted address");
    Ok(Json(MessageBody::new("Address deleted")))
}
