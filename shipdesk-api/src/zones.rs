use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shipdesk_catalog::Zone;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ZoneQuery {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct ZoneResponse {
    pub city: String,
    #[serde(flatten)]
    pub zone: Zone,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/zones", get(lookup_zone))
}

/// GET /v1/zones?city=
///
/// Never fails; unknown cities get the remote rate.
pub async fn lookup_zone(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> Json<ZoneResponse> {
    let zone = state.manager.pricer().zone_for(&query.city);
    Json(ZoneResponse { city: query.city, zone })
}
