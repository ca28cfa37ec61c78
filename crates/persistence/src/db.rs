//! Database handle: pool construction and schema migration.
//!
//! The schema is applied inline via `include_str!` on first open, so a fresh
//! database file is usable immediately and an existing one is a no-op.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use gl_domain::error::{Error, Result};

const SCHEMA: &str = include_str!("../migrations/001_schema.sql");

/// Shared handle to the Greenlight SQLite database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at the given path and apply the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(from_sqlx)?;

        apply_schema(&pool).await?;

        tracing::info!(path = %path.display(), "database ready");
        Ok(Self { pool })
    }

    /// Open an in-memory database for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .pragma("foreign_keys", "ON");

        // A single never-recycled connection keeps every query on the same
        // in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(from_sqlx)?;

        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await.map_err(from_sqlx)?;
    Ok(())
}

/// Convert an [`sqlx::Error`] into the domain [`Error`] type.
pub(crate) fn from_sqlx(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}
