use crate::error::ServerResult;
use crate::routes::{BedeutungenResponse, NachrichtResponse};
use crate::state::ServerState;
use abkverz::{RegistryResult, RegistryStore, normalize};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

/// Run a store mutation on the blocking pool
///
/// Mutations hold the registry write lock across the file flush, so they stay
/// off the async workers.
async fn mutate_blocking<T, F>(state: &ServerState, op: F) -> ServerResult<T>
where
    F: FnOnce(&RegistryStore) -> RegistryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    Ok(tokio::task::spawn_blocking(move || op(&store)).await??)
}

/// Add a meaning, creating the abbreviation if it is new
///
/// `POST /abkverz/v1/dazu/{abk}/{bedeutung}`: 201 with the full list, or 409
/// with the unchanged list when the meaning is already present.
pub async fn dazu(
    State(state): State<Arc<ServerState>>,
    Path((abk, bedeutung)): Path<(String, String)>,
) -> ServerResult<(StatusCode, Json<BedeutungenResponse>)> {
    let key = normalize(&abk);
    let bedeutungen = {
        let key = key.clone();
        mutate_blocking(&state, move |store| store.add_meaning(&key, &bedeutung)).await?
    };

    tracing::info!(abk = %key, bedeutungen = bedeutungen.len(), "Meaning added");
    Ok((
        StatusCode::CREATED,
        Json(BedeutungenResponse {
            erfolg: true,
            bedeutungen,
            fehler: None,
        }),
    ))
}

/// Delete an abbreviation with all its meanings
///
/// `DELETE /abkverz/v1/loesche/abkuerzung/{abk}`
pub async fn loesche_abkuerzung(
    State(state): State<Arc<ServerState>>,
    Path(abk): Path<String>,
) -> ServerResult<Json<NachrichtResponse>> {
    let key = normalize(&abk);
    let anzahl = {
        let key = key.clone();
        mutate_blocking(&state, move |store| store.remove_abbreviation(&key)).await?
    };

    tracing::info!(abk = %key, anzahl, "Abbreviation deleted");
    Ok(Json(NachrichtResponse {
        erfolg: true,
        nachricht: format!("Abkürzung \"{key}\" mit {anzahl} Bedeutungen gelöscht."),
    }))
}

/// Delete one meaning of an abbreviation
///
/// `DELETE /abkverz/v1/loesche/bedeutung/{abk}/{bedeutung}`: 404 when the
/// abbreviation or meaning is unknown, 400 when it is the only meaning.
pub async fn loesche_bedeutung(
    State(state): State<Arc<ServerState>>,
    Path((abk, bedeutung)): Path<(String, String)>,
) -> ServerResult<Json<NachrichtResponse>> {
    let key = normalize(&abk);
    {
        let key = key.clone();
        let bedeutung = bedeutung.clone();
        mutate_blocking(&state, move |store| store.remove_meaning(&key, &bedeutung)).await?;
    }

    tracing::info!(abk = %key, "Meaning deleted");
    Ok(Json(NachrichtResponse {
        erfolg: true,
        nachricht: format!("Bedeutung \"{bedeutung}\" für Abkürzung \"{key}\" gelöscht."),
    }))
}
