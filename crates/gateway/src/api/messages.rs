//! Agent interaction endpoint — one message in, one pipeline run out.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use uuid::Uuid;

use gl_domain::error::Error;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    /// User message; must be non-empty.
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/sessions/:id/messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Send a message to the agent pipeline and wait for the full response.
///
/// The reply carries the synthesized pitch text plus the ordered per-step
/// trace. A session without a database row is a 404; a per-step gateway
/// failure is *not* an HTTP error — it shows up in the trace instead.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<MessageBody>,
) -> impl IntoResponse {
    let message = body.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }

    match state.service.send_message(session_id, message).await {
        Ok(result) => Json(serde_json::json!({
            "session_id": session_id,
            "response": result.final_text,
            "thoughts": result.trace,
        }))
        .into_response(),
        Err(Error::SessionNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "session not found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(%session_id, error = %e, "message processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("error processing message: {e}") })),
            )
                .into_response()
        }
    }
}
