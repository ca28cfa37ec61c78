pub mod messages;
pub mod sessions;
pub mod ws;

use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/health", get(health))
        // Sessions
        .route("/v1/sessions", post(sessions::create_session))
        .route("/v1/sessions/:id", get(sessions::get_session))
        .route("/v1/sessions/:id/close", post(sessions::close_session))
        .route("/v1/sessions/:id/history", get(sessions::get_history))
        // Messages (core pipeline)
        .route("/v1/sessions/:id/messages", post(messages::send_message))
        // WebSocket streaming channel
        .route("/v1/sessions/:id/ws", get(ws::session_ws))
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
