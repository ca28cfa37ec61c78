//! Session rows: creation, lookup, and status transitions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gl_domain::error::Result;
use sqlx::SqlitePool;

use crate::db::{from_sqlx, Database};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Row types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            "failed" => SessionStatus::Failed,
            "cancelled" => SessionStatus::Cancelled,
            _ => SessionStatus::Active,
        }
    }
}

/// One row of the `sessions` table.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRow {
    pub id: Uuid,
    pub status: SessionStatus,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parse an RFC 3339 timestamp or fall back to now.
fn parse_rfc3339_or_now(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_from_parts(
    id: String,
    status: String,
    metadata: Option<String>,
    created_at: String,
    updated_at: String,
) -> SessionRow {
    SessionRow {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        status: SessionStatus::from_str(&status),
        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
        created_at: parse_rfc3339_or_now(&created_at),
        updated_at: parse_rfc3339_or_now(&updated_at),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Repository
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// CRUD access to the `sessions` table.
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Insert a new active session and return its row.
    pub async fn create(&self) -> Result<SessionRow> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        sqlx::query(
            "INSERT INTO sessions (id, status, created_at, updated_at) \
             VALUES (?1, 'active', ?2, ?2)",
        )
        .bind(id.to_string())
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;

        tracing::debug!(session_id = %id, "session row created");

        Ok(SessionRow {
            id,
            status: SessionStatus::Active,
            metadata: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Look up a session by ID.
    pub async fn get(&self, id: Uuid) -> Result<Option<SessionRow>> {
        let row: Option<(String, String, Option<String>, String, String)> = sqlx::query_as(
            "SELECT id, status, metadata, created_at, updated_at \
             FROM sessions WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx)?;

        Ok(row.map(|(id, status, metadata, created, updated)| {
            row_from_parts(id, status, metadata, created, updated)
        }))
    }

    /// Move a session to a new status; returns whether the row existed.
    pub async fn set_status(&self, id: Uuid, status: SessionStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(&db);

        let created = repo.create().await.unwrap();
        assert_eq!(created.status, SessionStatus::Active);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.status, SessionStatus::Active);
        assert!(fetched.metadata.is_none());
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(&db);
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_status_updates_existing_rows_only() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(&db);

        let created = repo.create().await.unwrap();
        assert!(repo
            .set_status(created.id, SessionStatus::Completed)
            .await
            .unwrap());
        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, SessionStatus::Completed);

        assert!(!repo
            .set_status(Uuid::new_v4(), SessionStatus::Failed)
            .await
            .unwrap());
    }
}
