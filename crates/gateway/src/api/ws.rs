//! WebSocket channel for agent interaction.
//!
//! Flow:
//! 1. Client connects to `/v1/sessions/:id/ws`
//! 2. Client sends `{"message": "..."}` frames
//! 3. Gateway acknowledges with a `status` frame, runs the pipeline, then
//!    sends a `response` frame (or an `error` frame)
//! 4. Loop until the client disconnects

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use gl_domain::error::Error;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(default)]
    message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /v1/sessions/:id/ws — upgrade to WebSocket.
pub async fn session_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Socket loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn handle_socket(mut socket: WebSocket, state: AppState, session_id: Uuid) {
    tracing::debug!(%session_id, "websocket connected");

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(Message::Text(raw)) => raw,
            Ok(Message::Close(_)) | Err(_) => break,
            // Ping/pong and binary frames are ignored.
            Ok(_) => continue,
        };

        let inbound: InboundFrame = match serde_json::from_str(&frame) {
            Ok(inbound) => inbound,
            Err(_) => {
                if send_error(&mut socket, "invalid JSON frame").await.is_err() {
                    break;
                }
                continue;
            }
        };

        let message = inbound.message.trim().to_owned();
        if message.is_empty() {
            if send_error(&mut socket, "message cannot be empty").await.is_err() {
                break;
            }
            continue;
        }

        // Acknowledge before the (potentially long) pipeline run.
        let ack = serde_json::json!({
            "type": "status",
            "content": "Processing your message...",
        });
        if send_json(&mut socket, &ack).await.is_err() {
            break;
        }

        match state.service.send_message(session_id, &message).await {
            Ok(result) => {
                let frame = serde_json::json!({
                    "type": "response",
                    "content": result.final_text,
                    "session_id": session_id,
                    "thoughts": result.trace,
                });
                if send_json(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            Err(Error::SessionNotFound(_)) => {
                if send_error(&mut socket, "session not found").await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(%session_id, error = %e, "websocket message processing failed");
                let text = format!("error processing message: {e}");
                if send_error(&mut socket, &text).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(%session_id, "websocket closed");
}

async fn send_json(socket: &mut WebSocket, value: &serde_json::Value) -> Result<(), axum::Error> {
    socket.send(Message::Text(value.to_string())).await
}

async fn send_error(socket: &mut WebSocket, content: &str) -> Result<(), axum::Error> {
    let frame = serde_json::json!({ "type": "error", "content": content });
    send_json(socket, &frame).await
}
