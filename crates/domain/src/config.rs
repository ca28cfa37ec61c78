use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Check the resolved configuration for fatal problems.
    ///
    /// Returns human-readable error strings; an empty vec means the config
    /// is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be non-zero".into());
        }
        if self.completion.base_url.is_empty() {
            errors.push("completion.base_url must not be empty".into());
        }
        if self.completion.model.is_empty() {
            errors.push("completion.model must not be empty".into());
        }
        if self.database.path.as_os_str().is_empty() {
            errors.push("database.path must not be empty".into());
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_8000")]
    pub port: u16,
    /// Origins allowed by the CORS layer. `*` entries are passed through
    /// verbatim.
    #[serde(default = "d_origins")]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_8000(),
            cors_allowed_origins: d_origins(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Database
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file. Created on first open.
    #[serde(default = "d_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: d_db_path() }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completion gateway
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the OpenAI-compatible completion endpoint
/// (a LiteLLM proxy in the reference deployment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "d_completion_url")]
    pub base_url: String,
    /// Plaintext API key. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable to read the API key from when `api_key` is unset.
    #[serde(default = "d_key_env")]
    pub api_key_env: String,
    /// Default model, used by every role that has no explicit override.
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl CompletionConfig {
    /// Resolve the API key: explicit config field first, then the
    /// configured environment variable. `None` means anonymous access
    /// (valid for local proxies).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            tracing::warn!(
                "API key loaded from plaintext config field 'api_key' — \
                 prefer 'api_key_env' instead"
            );
            return Some(key.clone());
        }
        std::env::var(&self.api_key_env).ok().filter(|v| !v.is_empty())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: d_completion_url(),
            api_key: None,
            api_key_env: d_key_env(),
            model: d_model(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory completed pitch documents are written to.
    #[serde(default = "d_output_dir")]
    pub output_dir: PathBuf,
    /// When true, the researcher step's input is enriched with a Wikipedia
    /// summary of the user's topic (best effort).
    #[serde(default = "d_true")]
    pub wikipedia_enrichment: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: d_output_dir(),
            wikipedia_enrichment: true,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_8000() -> u16 {
    8000
}
fn d_origins() -> Vec<String> {
    vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()]
}
fn d_db_path() -> PathBuf {
    PathBuf::from("greenlight.db")
}
fn d_completion_url() -> String {
    "http://localhost:4000/v1".into()
}
fn d_key_env() -> String {
    "GREENLIGHT_API_KEY".into()
}
fn d_model() -> String {
    "gemini-1.5-flash".into()
}
fn d_timeout_ms() -> u64 {
    120_000
}
fn d_output_dir() -> PathBuf {
    PathBuf::from("pitches")
}
fn d_true() -> bool {
    true
}
