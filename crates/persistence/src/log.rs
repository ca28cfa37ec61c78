//! The append-only audit trail: questions asked, answers given, and state
//! snapshots taken across a session's pipeline runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gl_domain::error::Result;
use sqlx::SqlitePool;

use crate::db::{from_sqlx, Database};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Recorder of the pipeline's question/answer/state audit trail.
///
/// The runner treats every method as best-effort: a failed write is logged
/// and the run continues, because losing an audit row is less harmful than
/// failing an otherwise-successful pipeline.
#[async_trait::async_trait]
pub trait PersistenceLog: Send + Sync {
    /// Record an inbound question; returns the new question ID.
    async fn save_question(
        &self,
        session_id: Uuid,
        question_text: &str,
        agent_name: Option<&str>,
    ) -> Result<Uuid>;

    /// Record an agent's answer, optionally linked to the question that
    /// prompted it; returns the new answer ID.
    async fn save_answer(
        &self,
        session_id: Uuid,
        agent_name: &str,
        answer_text: &str,
        question_id: Option<Uuid>,
    ) -> Result<Uuid>;

    /// Record a snapshot of the session's accumulated state.
    async fn save_state_snapshot(
        &self,
        session_id: Uuid,
        state: &serde_json::Value,
    ) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Read-side row types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One row of the `questions` table.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionRow {
    pub id: Uuid,
    pub question_text: String,
    pub agent_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One row of the `answers` table.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRow {
    pub id: Uuid,
    pub question_id: Option<Uuid>,
    pub agent_name: String,
    pub answer_text: String,
    pub created_at: DateTime<Utc>,
}

fn parse_rfc3339_or_now(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SQLite implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`PersistenceLog`] backed by the Greenlight SQLite database.
pub struct SqlitePersistenceLog {
    pool: SqlitePool,
}

impl SqlitePersistenceLog {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// All questions recorded for a session, oldest first.
    pub async fn questions_for(&self, session_id: Uuid) -> Result<Vec<QuestionRow>> {
        let rows: Vec<(String, String, Option<String>, String)> = sqlx::query_as(
            "SELECT id, question_text, agent_name, created_at \
             FROM questions WHERE session_id = ?1 ORDER BY created_at, id",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx)?;

        Ok(rows
            .into_iter()
            .map(|(id, question_text, agent_name, created_at)| QuestionRow {
                id: Uuid::parse_str(&id).unwrap_or_default(),
                question_text,
                agent_name,
                created_at: parse_rfc3339_or_now(&created_at),
            })
            .collect())
    }

    /// All answers recorded for a session, oldest first.
    pub async fn answers_for(&self, session_id: Uuid) -> Result<Vec<AnswerRow>> {
        let rows: Vec<(String, Option<String>, String, String, String)> = sqlx::query_as(
            "SELECT id, question_id, agent_name, answer_text, created_at \
             FROM answers WHERE session_id = ?1 ORDER BY created_at, id",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx)?;

        Ok(rows
            .into_iter()
            .map(
                |(id, question_id, agent_name, answer_text, created_at)| AnswerRow {
                    id: Uuid::parse_str(&id).unwrap_or_default(),
                    question_id: question_id.and_then(|q| Uuid::parse_str(&q).ok()),
                    agent_name,
                    answer_text,
                    created_at: parse_rfc3339_or_now(&created_at),
                },
            )
            .collect())
    }

    /// The most recent state snapshot for a session, if any.
    pub async fn latest_state(&self, session_id: Uuid) -> Result<Option<serde_json::Value>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT state_value FROM session_states \
             WHERE session_id = ?1 ORDER BY version DESC, id DESC LIMIT 1",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx)?;

        Ok(row.and_then(|(value,)| serde_json::from_str(&value).ok()))
    }
}

#[async_trait::async_trait]
impl PersistenceLog for SqlitePersistenceLog {
    async fn save_question(
        &self,
        session_id: Uuid,
        question_text: &str,
        agent_name: Option<&str>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO questions (id, session_id, question_text, agent_name, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(id.to_string())
        .bind(session_id.to_string())
        .bind(question_text)
        .bind(agent_name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;

        tracing::debug!(%session_id, question_id = %id, "question saved");
        Ok(id)
    }

    async fn save_answer(
        &self,
        session_id: Uuid,
        agent_name: &str,
        answer_text: &str,
        question_id: Option<Uuid>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO answers (id, session_id, question_id, agent_name, answer_text, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(id.to_string())
        .bind(session_id.to_string())
        .bind(question_id.map(|q| q.to_string()))
        .bind(agent_name)
        .bind(answer_text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;

        tracing::debug!(%session_id, agent = agent_name, answer_id = %id, "answer saved");
        Ok(id)
    }

    async fn save_state_snapshot(
        &self,
        session_id: Uuid,
        state: &serde_json::Value,
    ) -> Result<()> {
        let state_json = serde_json::to_string(state)?;

        // Versions are per-session and monotonically increasing.
        sqlx::query(
            "INSERT INTO session_states (session_id, state_key, state_value, version, created_at) \
             SELECT ?1, 'full_state', ?2, COALESCE(MAX(version), 0) + 1, ?3 \
             FROM session_states WHERE session_id = ?1",
        )
        .bind(session_id.to_string())
        .bind(state_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;

        tracing::debug!(%session_id, "state snapshot saved");
        Ok(())
    }
}
