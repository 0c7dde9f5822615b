use crate::routes::MetrikenResponse;
use crate::state::ServerState;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;

/// `GET /abkverz/v1/metriken`
pub async fn metriken(State(state): State<Arc<ServerState>>) -> Json<MetrikenResponse> {
    let metrics = state.store.metrics();
    Json(MetrikenResponse {
        anzahl_abkuerzungen: metrics.abbreviation_count,
        anzahl_bedeutungen: metrics.meaning_count,
    })
}
