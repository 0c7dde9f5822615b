use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use std::sync::Arc;

/// Response header carrying the running request count
pub const REQUEST_COUNTER_HEADER: &str = "x-request-zaehler";

#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    #[serde(rename = "API_KEY")]
    pub api_key: Option<String>,
}

/// API key gate
///
/// Only active when `require_api_key` is configured. The key travels as the
/// `API_KEY` query parameter; an unparsable query counts as a missing key.
pub async fn api_key_check(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<ApiKeyQuery>, QueryRejection>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !state.config.require_api_key {
        return Ok(next.run(request).await);
    }

    let api_key = query.ok().and_then(|Query(q)| q.api_key);
    match api_key.as_deref() {
        None | Some("") => Err(ServerError::Authentication(
            "Kein API-Key übergeben".to_string(),
        )),
        Some(key) if state.is_valid_api_key(key) => Ok(next.run(request).await),
        Some(_) => Err(ServerError::Authentication("Ungültiger API-Key".to_string())),
    }
}

/// Request counting middleware
pub async fn count_requests(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let count = state.next_request_count();
    tracing::info!(request_count = count, "Anzahl Requests: {count}");

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REQUEST_COUNTER_HEADER, HeaderValue::from(count));

    response
}

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let timestamp = chrono::Utc::now().to_rfc3339();
    let start = std::time::Instant::now();

    tracing::info!(
        timestamp = %timestamp,
        method = %method,
        uri = %uri,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
