//! Per-step execution traces returned alongside a run's final text.

use serde::{Deserialize, Serialize};

/// Lifecycle of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The step has been rendered and is waiting on the gateway.
    Starting,
    Completed,
    Error,
}

/// Summary of one agent step within a run. Finalized when the gateway call
/// resolves and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTrace {
    pub agent: String,
    /// Output text on success, a human-readable error message on failure.
    pub text: String,
    pub status: StepStatus,
}

/// The externally visible output of one pipeline run: the synthesized final
/// document plus one trace entry per configured step, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub final_text: String,
    pub trace: Vec<StepTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StepStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(serde_json::to_string(&StepStatus::Error).unwrap(), "\"error\"");
    }
}
