//! Pipeline execution — the orchestrator that drives the fixed agent
//! sequence for one session and records everything it does.
//!
//! A run walks greeter → researcher → screenwriter → critic in order. Each
//! step's prompt is rendered from the session's accumulated state, sent to
//! the completion gateway, and the output merged back into state for the
//! next step. A failed gateway call marks its step `error` and the run
//! keeps going with the error text as that step's context value; one flaky
//! call must not discard the whole pipeline. Only session resolution and a
//! missing-context defect abort a run.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use gl_domain::agent::AgentRole;
use gl_domain::error::Result;
use gl_domain::trace::{StepStatus, StepTrace, TranscriptResult};
use gl_persistence::PersistenceLog;
use gl_providers::{CompletionGateway, CompletionRequest};
use gl_sessions::{SessionCache, SessionRecord};

use crate::runtime::prompts::PromptRegistry;
use crate::tools::{write_pitch, WikipediaClient};

/// Drives pipeline runs for one session.
///
/// Runners are cached per session ID by the session service, so repeated
/// messages reuse both this runner and its underlying session record.
pub struct PipelineRunner {
    session_id: Uuid,
    cache: Arc<SessionCache>,
    log: Arc<dyn PersistenceLog>,
    gateway: Arc<dyn CompletionGateway>,
    prompts: Arc<PromptRegistry>,
    /// Resolved session record; populated by `initialize`.
    session: RwLock<Option<Arc<SessionRecord>>>,
    /// When present, the researcher step's input is enriched with a topic
    /// summary (best effort).
    research: Option<Arc<WikipediaClient>>,
    /// When present, completed runs write their pitch document here.
    output_dir: Option<PathBuf>,
}

impl PipelineRunner {
    pub fn new(
        session_id: Uuid,
        cache: Arc<SessionCache>,
        log: Arc<dyn PersistenceLog>,
        gateway: Arc<dyn CompletionGateway>,
        prompts: Arc<PromptRegistry>,
        research: Option<Arc<WikipediaClient>>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            session_id,
            cache,
            log,
            gateway,
            prompts,
            session: RwLock::new(None),
            research,
            output_dir,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Resolve (or create) this runner's session record. Idempotent; a
    /// no-op once the record is held.
    pub fn initialize(&self) {
        let _ = self.resolve_session();
    }

    fn resolve_session(&self) -> Arc<SessionRecord> {
        if let Some(record) = self.session.read().as_ref() {
            return Arc::clone(record);
        }
        let record = self.cache.get_or_create(self.session_id);
        *self.session.write() = Some(Arc::clone(&record));
        record
    }

    /// Execute the full agent sequence for one inbound message.
    ///
    /// Always returns a transcript with one trace entry per configured
    /// step; per-step gateway failures are folded into the trace. The only
    /// errors surfaced to the caller are defects (missing predecessor
    /// context, which implies broken step ordering).
    pub async fn run(&self, message: &str) -> Result<TranscriptResult> {
        let record = self.resolve_session();

        let question_id = match self
            .log
            .save_question(self.session_id, message, Some("user"))
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "failed to save question");
                None
            }
        };

        let mut trace: Vec<StepTrace> = Vec::with_capacity(self.prompts.pipeline().len());

        for descriptor in self.prompts.pipeline() {
            let role = descriptor.role;
            let mut input = self.prompts.render(role, message, &record)?;
            if role == AgentRole::Researcher {
                input = self.maybe_enrich_research(input, message, &record).await;
            }

            tracing::debug!(session_id = %self.session_id, agent = %role, "step starting");

            match self
                .gateway
                .complete(CompletionRequest {
                    model: descriptor.model.clone(),
                    system_instruction: descriptor.instruction.clone(),
                    input,
                })
                .await
            {
                Ok(output) => {
                    record.set(role.context_key(), output.as_str());
                    if let Err(e) = self
                        .log
                        .save_answer(self.session_id, role.as_str(), &output, question_id)
                        .await
                    {
                        tracing::warn!(
                            session_id = %self.session_id,
                            agent = %role,
                            error = %e,
                            "failed to save step answer"
                        );
                    }
                    trace.push(StepTrace {
                        agent: role.as_str().to_owned(),
                        text: output,
                        status: StepStatus::Completed,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        agent = %role,
                        error = %e,
                        "step failed, continuing pipeline"
                    );
                    let placeholder = format!("Error executing {role}: {e}");
                    record.set(role.context_key(), placeholder.as_str());
                    trace.push(StepTrace {
                        agent: role.as_str().to_owned(),
                        text: placeholder,
                        status: StepStatus::Error,
                    });
                }
            }
        }

        let final_text = compose_final_text(&record);

        if let Err(e) = self
            .log
            .save_answer(self.session_id, "greeter", &final_text, question_id)
            .await
        {
            tracing::warn!(session_id = %self.session_id, error = %e, "failed to save final answer");
        }

        match serde_json::to_value(record.snapshot()) {
            Ok(state) => {
                if let Err(e) = self.log.save_state_snapshot(self.session_id, &state).await {
                    tracing::warn!(session_id = %self.session_id, error = %e, "failed to save state snapshot");
                }
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "state snapshot not serializable");
            }
        }

        self.maybe_write_pitch(message, &final_text, &trace).await;

        Ok(TranscriptResult { final_text, trace })
    }

    /// Fetch a topic summary and fold it into the researcher input, keeping
    /// each run's summary in the session's research notes. Lookup failures
    /// degrade to the un-enriched prompt.
    async fn maybe_enrich_research(
        &self,
        input: String,
        topic: &str,
        record: &SessionRecord,
    ) -> String {
        let Some(wikipedia) = &self.research else {
            return input;
        };
        match wikipedia.summary(topic).await {
            Ok(summary) => {
                record.append("research_notes", summary.as_str());
                enriched_input(&input, &summary)
            }
            Err(e) => {
                tracing::debug!(topic, error = %e, "wikipedia enrichment unavailable");
                input
            }
        }
    }

    async fn maybe_write_pitch(&self, topic: &str, final_text: &str, trace: &[StepTrace]) {
        let Some(dir) = &self.output_dir else {
            return;
        };
        let screenwriter_completed = trace.iter().any(|step| {
            step.agent == AgentRole::Screenwriter.as_str() && step.status == StepStatus::Completed
        });
        if !screenwriter_completed {
            return;
        }
        if let Err(e) = write_pitch(dir, topic, final_text).await {
            tracing::warn!(session_id = %self.session_id, error = %e, "failed to write pitch document");
        }
    }
}

/// The synthesized end-of-pipeline document: plot outline plus the critic's
/// notes (either may carry a step's error placeholder).
fn compose_final_text(record: &SessionRecord) -> String {
    let outline = record
        .get_text(AgentRole::Screenwriter.context_key())
        .unwrap_or_default();
    let critique = record
        .get_text(AgentRole::Critic.context_key())
        .unwrap_or_default();

    format!("# Film Concept Pitch\n\n{outline}\n\n---\n**Critic's Notes:**\n{critique}\n")
}

fn enriched_input(input: &str, summary: &str) -> String {
    format!("{input}\n\nBackground from Wikipedia:\n{summary}")
}
