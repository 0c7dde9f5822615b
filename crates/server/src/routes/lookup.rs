use crate::error::{ServerError, ServerResult};
use crate::routes::AbfrageResponse;
use crate::state::ServerState;
use abkverz::normalize;
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;

/// Meanings of one abbreviation
///
/// `GET /abkverz/v1/abfrage/{abk}`: 200 with the meanings in insertion
/// order, or 404 with an empty `ergebnis` array.
pub async fn abfrage(
    State(state): State<Arc<ServerState>>,
    Path(abk): Path<String>,
) -> ServerResult<Json<AbfrageResponse>> {
    let key = normalize(&abk);
    let ergebnis = state
        .store
        .lookup(&key)
        .ok_or(ServerError::UnknownAbbreviation(key))?;

    Ok(Json(AbfrageResponse {
        erfolg: true,
        ergebnis,
    }))
}
