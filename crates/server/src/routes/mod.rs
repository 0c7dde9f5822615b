//! API route handlers
//!
//! All endpoints live under `/abkverz/v1` and are thin wrappers over
//! [`abkverz::RegistryStore`]:
//!
//! - `lookup`: `GET /abfrage/{abk}`
//! - `entries`: `POST /dazu/{abk}/{bedeutung}`, `DELETE /loesche/...`
//! - `metrics`: `GET /metriken`
//!
//! Path segments arrive percent-decoded from the `Path` extractor. The
//! abbreviation is normalized before it reaches the store; the meaning is
//! passed through verbatim.

pub mod entries;
pub mod lookup;
pub mod metrics;

use crate::error::ServerError;
use serde::{Deserialize, Serialize};

/// Body of `GET /abfrage/{abk}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbfrageResponse {
    pub erfolg: bool,
    pub ergebnis: Vec<String>,
}

/// Body of `POST /dazu/{abk}/{bedeutung}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedeutungenResponse {
    pub erfolg: bool,
    pub bedeutungen: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fehler: Option<String>,
}

/// Body of both `DELETE /loesche/...` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NachrichtResponse {
    pub erfolg: bool,
    pub nachricht: String,
}

/// Body of `GET /metriken`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetrikenResponse {
    pub anzahl_abkuerzungen: usize,
    pub anzahl_bedeutungen: usize,
}

/// 404 for unknown paths under the API prefix
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
