use abkverz::{CanonicalKey, RegistryError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Registry outcomes keep the body shape of the endpoint that produces them:
/// `AlreadyExists` only comes from `POST /dazu`, the not-found and
/// last-meaning cases only from the `DELETE /loesche` endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Authentication(String),

    #[error("unknown abbreviation \"{0}\"")]
    UnknownAbbreviation(CanonicalKey),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::UnknownAbbreviation(_) | ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Registry(err) => match err {
                RegistryError::NotFound { .. } | RegistryError::MeaningNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                RegistryError::AlreadyExists { .. } => StatusCode::CONFLICT,
                RegistryError::LastMeaning { .. } | RegistryError::EmptyMeaning { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RegistryError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Blocking(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// German user-facing message
    fn nachricht(&self) -> String {
        match self {
            ServerError::Registry(err) => match err {
                RegistryError::NotFound { key } => format!("Abkürzung \"{key}\" nicht gefunden."),
                RegistryError::MeaningNotFound { key, meaning } => {
                    format!("Bedeutung \"{meaning}\" für Abkürzung \"{key}\" nicht gefunden.")
                }
                RegistryError::AlreadyExists { key, meaning, .. } => {
                    format!("Bedeutung \"{meaning}\" für Abkürzung \"{key}\" bereits vorhanden.")
                }
                RegistryError::LastMeaning { key } => format!(
                    "Einzige Bedeutung für Abkürzung \"{key}\" kann nicht gelöscht werden."
                ),
                RegistryError::EmptyMeaning { key } => {
                    format!("Leere Bedeutung für Abkürzung \"{key}\" nicht erlaubt.")
                }
                RegistryError::Persistence(_) => {
                    "Änderung konnte nicht gespeichert werden.".to_string()
                }
            },
            ServerError::NotFound => "Pfad nicht gefunden.".to_string(),
            ServerError::Blocking(_) | ServerError::Config(_) => {
                "Interner Serverfehler.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = match &self {
            ServerError::Authentication(message) => json!({
                "erfolg": false,
                "ergebnis": message,
            }),
            ServerError::UnknownAbbreviation(_) => json!({
                "erfolg": false,
                "ergebnis": [],
            }),
            ServerError::Registry(RegistryError::AlreadyExists { current, .. }) => json!({
                "erfolg": false,
                "bedeutungen": current,
                "fehler": self.nachricht(),
            }),
            _ => json!({
                "erfolg": false,
                "nachricht": self.nachricht(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<abkverz::PersistError> for ServerError {
    fn from(err: abkverz::PersistError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<abkverz::ConfigLoadError> for ServerError {
    fn from(err: abkverz::ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}
