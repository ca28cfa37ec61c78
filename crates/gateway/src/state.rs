use std::sync::Arc;

use gl_domain::config::Config;
use gl_persistence::{SessionRepository, SqlitePersistenceLog};

use crate::runtime::SessionService;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Session + pipeline orchestration.
    pub service: Arc<SessionService>,
    /// Direct session-row reads for detail endpoints.
    pub repository: Arc<SessionRepository>,
    /// Read side of the audit trail (question/answer history).
    pub audit: Arc<SqlitePersistenceLog>,
}
