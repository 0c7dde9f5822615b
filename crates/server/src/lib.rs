//! Abkverz Server - HTTP REST API for the abbreviation registry
//!
//! Exposes an [`abkverz::RegistryStore`] over HTTP and serves a static web
//! front end for every path outside the API.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! All under `/abkverz/v1`:
//!
//! - `GET /abfrage/{abk}` - Meanings of an abbreviation
//! - `GET /metriken` - Number of abbreviations and meanings
//! - `POST /dazu/{abk}/{bedeutung}` - Add a meaning
//! - `DELETE /loesche/abkuerzung/{abk}` - Delete an abbreviation
//! - `DELETE /loesche/bedeutung/{abk}/{bedeutung}` - Delete one meaning
//!
//! Every response carries an `X-REQUEST-ZAEHLER` header. With
//! `require_api_key` enabled, requests must pass `?API_KEY=<key>`; rejected
//! requests are neither counted nor given the header.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{API_PREFIX, build_router, start_server};
pub use state::ServerState;
