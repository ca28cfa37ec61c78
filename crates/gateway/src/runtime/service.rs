//! Session service — the thin composition layer between transport handlers
//! and pipeline runners.
//!
//! One runner is kept per session ID so repeated messages reuse the same
//! initialized session. Messaging a session that has no database row fails
//! with [`Error::SessionNotFound`]; that is the only error the transport
//! layer sees from a run besides context-ordering defects.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use gl_domain::error::{Error, Result};
use gl_domain::trace::TranscriptResult;
use gl_persistence::{PersistenceLog, SessionRepository, SessionRow};
use gl_providers::CompletionGateway;
use gl_sessions::SessionCache;

use crate::runtime::prompts::PromptRegistry;
use crate::runtime::runner::PipelineRunner;
use crate::tools::WikipediaClient;

/// High-level session operations: create sessions, route messages to the
/// per-session pipeline runner.
pub struct SessionService {
    cache: Arc<SessionCache>,
    repository: Arc<SessionRepository>,
    log: Arc<dyn PersistenceLog>,
    gateway: Arc<dyn CompletionGateway>,
    prompts: Arc<PromptRegistry>,
    research: Option<Arc<WikipediaClient>>,
    output_dir: Option<PathBuf>,
    runners: RwLock<HashMap<Uuid, Arc<PipelineRunner>>>,
}

impl SessionService {
    pub fn new(
        cache: Arc<SessionCache>,
        repository: Arc<SessionRepository>,
        log: Arc<dyn PersistenceLog>,
        gateway: Arc<dyn CompletionGateway>,
        prompts: Arc<PromptRegistry>,
        research: Option<Arc<WikipediaClient>>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            cache,
            repository,
            log,
            gateway,
            prompts,
            research,
            output_dir,
            runners: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new session row and return it.
    pub async fn create_session(&self) -> Result<SessionRow> {
        self.repository.create().await
    }

    /// Resolve the runner for a session, creating and initializing one on
    /// first use. Fails with [`Error::SessionNotFound`] when no session row
    /// exists.
    pub async fn runner_for(&self, session_id: Uuid) -> Result<Arc<PipelineRunner>> {
        if self.repository.get(session_id).await?.is_none() {
            return Err(Error::SessionNotFound(session_id));
        }

        if let Some(runner) = self.runners.read().get(&session_id) {
            return Ok(Arc::clone(runner));
        }

        let mut runners = self.runners.write();
        let runner = runners.entry(session_id).or_insert_with(|| {
            let runner = PipelineRunner::new(
                session_id,
                Arc::clone(&self.cache),
                Arc::clone(&self.log),
                Arc::clone(&self.gateway),
                Arc::clone(&self.prompts),
                self.research.clone(),
                self.output_dir.clone(),
            );
            runner.initialize();
            Arc::new(runner)
        });
        Ok(Arc::clone(runner))
    }

    /// Run the pipeline for one inbound message and return the transcript.
    pub async fn send_message(
        &self,
        session_id: Uuid,
        message: &str,
    ) -> Result<TranscriptResult> {
        let runner = self.runner_for(session_id).await?;
        runner.run(message).await
    }

    /// Drop a session's runner and cached record. Returns whether anything
    /// was cached. The session row itself is untouched.
    pub fn evict_session(&self, session_id: Uuid) -> bool {
        let had_runner = self.runners.write().remove(&session_id).is_some();
        let had_record = self.cache.invalidate(session_id);
        had_runner || had_record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_domain::agent::default_roster;
    use gl_persistence::{Database, SqlitePersistenceLog};
    use gl_providers::CompletionRequest;

    struct EchoGateway;

    #[async_trait::async_trait]
    impl CompletionGateway for EchoGateway {
        async fn complete(&self, req: CompletionRequest) -> Result<String> {
            Ok(format!("echo: {}", req.input.lines().next().unwrap_or("")))
        }
    }

    async fn service_fixture() -> (Database, SessionService) {
        let db = Database::open_in_memory().await.unwrap();
        let service = SessionService::new(
            Arc::new(SessionCache::new()),
            Arc::new(SessionRepository::new(&db)),
            Arc::new(SqlitePersistenceLog::new(&db)),
            Arc::new(EchoGateway),
            Arc::new(PromptRegistry::new(default_roster("test-model"))),
            None,
            None,
        );
        (db, service)
    }

    #[tokio::test]
    async fn unknown_session_is_a_distinct_error() {
        let (_db, service) = service_fixture().await;
        let missing = Uuid::new_v4();
        let err = service.send_message(missing, "hello").await.unwrap_err();
        match err {
            Error::SessionNotFound(id) => assert_eq!(id, missing),
            other => panic!("expected SessionNotFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn runner_is_cached_per_session() {
        let (_db, service) = service_fixture().await;
        let session = service.create_session().await.unwrap();

        let first = service.runner_for(session.id).await.unwrap();
        let second = service.runner_for(session.id).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = service.create_session().await.unwrap();
        let third = service.runner_for(other.id).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn send_message_returns_a_full_transcript() {
        let (db, service) = service_fixture().await;
        let session = service.create_session().await.unwrap();

        let result = service
            .send_message(session.id, "Tell a story about Ada Lovelace")
            .await
            .unwrap();

        assert_eq!(result.trace.len(), 4);
        assert!(result.final_text.contains("# Film Concept Pitch"));

        // The audit trail went to the relational store.
        let log = SqlitePersistenceLog::new(&db);
        assert_eq!(log.questions_for(session.id).await.unwrap().len(), 1);
        assert_eq!(log.answers_for(session.id).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn evict_session_forgets_runner_and_record() {
        let (_db, service) = service_fixture().await;
        let session = service.create_session().await.unwrap();

        let runner = service.runner_for(session.id).await.unwrap();
        assert!(service.evict_session(session.id));
        assert!(!service.evict_session(session.id));

        let fresh = service.runner_for(session.id).await.unwrap();
        assert!(!Arc::ptr_eq(&runner, &fresh));
    }
}
