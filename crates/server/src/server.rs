//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with the registry endpoints under `/abkverz/v1`
//! - Static file serving for every other path
//! - Middleware stack (logging, API key gate, request counting, timeout)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{api_key_check, count_requests, log_requests};
use crate::routes::{entries, lookup, metrics, not_found};
use crate::state::ServerState;
use axum::Router;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Path prefix of every registry endpoint
pub const API_PREFIX: &str = "/abkverz/v1";

/// Registry endpoints, relative to [`API_PREFIX`]
fn api_routes() -> Router<Arc<ServerState>> {
    Router::new()
        .route("/abfrage/{abk}", get(lookup::abfrage))
        .route("/metriken", get(metrics::metriken))
        .route("/dazu/{abk}/{bedeutung}", post(entries::dazu))
        .route(
            "/loesche/abkuerzung/{abk}",
            delete(entries::loesche_abkuerzung),
        )
        .route(
            "/loesche/bedeutung/{abk}/{bedeutung}",
            delete(entries::loesche_bedeutung),
        )
        .fallback(not_found)
}

/// Build the Axum router with all routes and middleware
///
/// Middleware stack (outermost first):
/// 1. Tracing
/// 2. Request logging
/// 3. API key gate (no-op unless `require_api_key` is set)
/// 4. Request counting (`X-REQUEST-ZAEHLER` header)
/// 5. Timeout
pub fn build_router(state: Arc<ServerState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest(API_PREFIX, api_routes())
        .fallback_service(static_files)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(from_fn_with_state(state.clone(), count_requests))
        .layer(from_fn_with_state(state.clone(), api_key_check))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the registry HTTP server
///
/// Sets up JSON logging, opens (or seeds) the data file, binds the configured
/// address and serves until SIGTERM or Ctrl+C.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    let state = Arc::new(ServerState::new(config.clone())?);
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting abkverz server on {} (data file {}, static dir {})",
        addr,
        config.data_file.display(),
        config.static_dir.display()
    );
    tracing::info!(
        "Timeout: {}s, API key required: {}",
        config.timeout_secs,
        config.require_api_key
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
