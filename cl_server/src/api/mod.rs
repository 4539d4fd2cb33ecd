//! HTTP/WebSocket API for the game server.
//!
//! A deliberately small surface: a health check and one WebSocket endpoint
//! per game. All gameplay flows over the socket; there is no REST API for
//! game actions.
//!
//! # Endpoints
//!
//! ```text
//! GET /health                      - Health check (public)
//! GET /ws/{game_id}?username=NAME  - Game WebSocket
//! ```
//!
//! The caller's identity is taken from the `username` query parameter;
//! authentication is assumed to happen upstream of this server.

pub mod websocket;

use axum::{
    Router,
    response::{IntoResponse, Json},
    routing::get,
};
use clue_less::session::SessionManager;
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Application state shared across handlers and WebSocket connections.
/// Cloning is cheap; the session map is shared.
#[derive(Clone)]
pub struct AppState {
    pub session_manager: SessionManager,
}

/// Create the API router with all endpoints and middleware.
///
/// CORS is configured permissively for development. In production,
/// configure appropriate origins, methods, and headers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws/{game_id}", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
