//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;

use gl_domain::agent::default_roster;
use gl_domain::config::Config;
use gl_persistence::{Database, PersistenceLog, SessionRepository, SqlitePersistenceLog};
use gl_providers::{CompletionGateway, OpenAiCompatGateway};
use gl_sessions::SessionCache;

use crate::runtime::{PromptRegistry, SessionService};
use crate::state::AppState;
use crate::tools::WikipediaClient;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("config: {error}");
        }
        anyhow::bail!("config validation failed with {} error(s)", errors.len());
    }

    // ── Database ─────────────────────────────────────────────────────
    let db = Database::open(&config.database.path)
        .await
        .context("opening database")?;
    let repository = Arc::new(SessionRepository::new(&db));
    let audit = Arc::new(SqlitePersistenceLog::new(&db));

    // ── Completion gateway ───────────────────────────────────────────
    let gateway: Arc<dyn CompletionGateway> = Arc::new(
        OpenAiCompatGateway::from_config(&config.completion)
            .context("initializing completion gateway")?,
    );
    tracing::info!(
        base_url = %config.completion.base_url,
        model = %config.completion.model,
        "completion gateway ready"
    );

    // ── Prompt registry (all roles normalized at startup) ────────────
    let prompts = Arc::new(PromptRegistry::new(default_roster(&config.completion.model)));

    // ── Research enrichment ──────────────────────────────────────────
    let research = if config.pipeline.wikipedia_enrichment {
        Some(Arc::new(
            WikipediaClient::new().context("initializing wikipedia client")?,
        ))
    } else {
        None
    };
    tracing::info!(
        enabled = research.is_some(),
        "wikipedia enrichment configured"
    );

    // ── Session service ──────────────────────────────────────────────
    let service = Arc::new(SessionService::new(
        Arc::new(SessionCache::new()),
        Arc::clone(&repository),
        Arc::clone(&audit) as Arc<dyn PersistenceLog>,
        gateway,
        prompts,
        research,
        Some(config.pipeline.output_dir.clone()),
    ));
    tracing::info!(
        output_dir = %config.pipeline.output_dir.display(),
        "session service ready"
    );

    Ok(AppState {
        config,
        service,
        repository,
        audit,
    })
}
