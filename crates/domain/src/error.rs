use uuid::Uuid;

/// Shared error type used across all Greenlight crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The completion gateway rejected or failed a request. Absorbed into
    /// the step trace by the pipeline runner, never fatal to a run.
    #[error("completion gateway: {0}")]
    Gateway(String),

    /// A session could not be located or created. The one error a run is
    /// allowed to surface to the transport layer.
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// A step's prompt needs a predecessor output that is not in the
    /// accumulated context. Only reachable through a step-ordering bug,
    /// so it fails loudly instead of rendering with empty text.
    #[error("missing context for {role}: no '{key}' in accumulated state")]
    MissingContext { role: String, key: String },

    #[error("database: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;
