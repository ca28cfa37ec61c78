//! Relational persistence for Greenlight, backed by SQLite via `sqlx`.
//!
//! Two seams face the rest of the system: [`SessionRepository`] for session
//! rows and the [`PersistenceLog`] trait for the append-only audit trail of
//! questions, answers, and state snapshots. The pipeline runner only ever
//! sees the trait, so it can be tested against an in-memory recorder.

pub mod db;
pub mod log;
pub mod repository;

pub use db::Database;
pub use log::{PersistenceLog, SqlitePersistenceLog};
pub use repository::{SessionRepository, SessionRow, SessionStatus};
