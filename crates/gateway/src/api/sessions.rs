//! Session management API endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use uuid::Uuid;

use gl_persistence::{SessionRow, SessionStatus};

use crate::state::AppState;

fn session_json(row: &SessionRow) -> serde_json::Value {
    serde_json::json!({
        "id": row.id,
        "status": row.status,
        "metadata": row.metadata,
        "created_at": row.created_at.to_rfc3339(),
        "updated_at": row.updated_at.to_rfc3339(),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Create a new filmmaking session.
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.create_session().await {
        Ok(row) => (StatusCode::CREATED, Json(session_json(&row))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to create session" })),
            )
                .into_response()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fetch session details by ID.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.repository.get(session_id).await {
        Ok(Some(row)) => Json(session_json(&row)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "session not found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(%session_id, error = %e, "session lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "session lookup failed" })),
            )
                .into_response()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/sessions/:id/close
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Close a session: mark its row completed and drop the cached runner and
/// accumulated state. The audit trail stays in the database.
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .repository
        .set_status(session_id, SessionStatus::Completed)
        .await
    {
        Ok(true) => {
            state.service.evict_session(session_id);
            Json(serde_json::json!({
                "id": session_id,
                "status": SessionStatus::Completed,
            }))
            .into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "session not found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(%session_id, error = %e, "session close failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "session close failed" })),
            )
                .into_response()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions/:id/history
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The recorded question/answer trail for a session, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.repository.get(session_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "session not found" })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(%session_id, error = %e, "session lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "session lookup failed" })),
            )
                .into_response();
        }
    }

    let questions = state.audit.questions_for(session_id).await;
    let answers = state.audit.answers_for(session_id).await;
    match (questions, answers) {
        (Ok(questions), Ok(answers)) => Json(serde_json::json!({
            "session_id": session_id,
            "questions": questions,
            "answers": answers,
        }))
        .into_response(),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(%session_id, error = %e, "history read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "history read failed" })),
            )
                .into_response()
        }
    }
}
