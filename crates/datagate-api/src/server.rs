// crates/datagate-api/src/server.rs
// ============================================================================
// Module: HTTP Server Assembly
// Description: Route table and listener loop for the download service.
// Purpose: Bind the configured address and serve the API and page routes.
// Dependencies: axum, tokio, thiserror
// ============================================================================

//! ## Overview
//! Builds the axum router over a shared [`AppState`] and runs the accept
//! loop. Peer addresses are captured through connect info so every audit
//! event can carry the caller IP.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::handlers::handle_healthz;
use crate::handlers::handle_listing;
use crate::handlers::handle_proxy;
use crate::handlers::handle_single_file;
use crate::pages::handle_page;
use crate::state::AppState;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and transport failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bind address or state wiring is unusable.
    #[error("server configuration error: {0}")]
    Configuration(String),
    /// Listener or connection handling failed.
    #[error("server transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the route table over shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handle_healthz))
        .route("/downloads/{tier}", get(handle_page))
        .route("/api/downloads/{tier}", get(handle_listing))
        .route("/api/download", post(handle_single_file))
        .route("/api/download/{*key}", get(handle_proxy))
        .with_state(state)
}

// ============================================================================
// SECTION: Accept Loop
// ============================================================================

/// Binds the address and serves requests until the listener fails.
///
/// # Errors
///
/// Returns [`ServerError::Configuration`] when the bind address is not a
/// socket address and [`ServerError::Transport`] when binding or serving
/// fails.
pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<(), ServerError> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|err| ServerError::Configuration(format!("bind address {bind}: {err}")))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| ServerError::Transport(format!("bind {addr}: {err}")))?;
    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|err| ServerError::Transport(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
