use gl_domain::error::Result;

/// One completion call: a persona instruction, an input text, a model.
///
/// This is deliberately narrow — the pipeline never streams, never uses
/// tools, and never sends multi-turn history; each step is a single
/// system + user exchange.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier understood by the gateway (e.g. `"gemini-1.5-flash"`).
    pub model: String,
    /// The agent persona prompt, sent as the system message.
    pub system_instruction: String,
    /// The rendered step input, sent as the user message.
    pub input: String,
}

/// Trait the pipeline runner calls for every step.
///
/// Implementations translate [`CompletionRequest`] into a provider's wire
/// format. Any failure surfaces as a single error the runner absorbs into
/// the step trace; the gateway owns its own timeout policy.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Generate the completion text for one step.
    async fn complete(&self, req: CompletionRequest) -> Result<String>;
}
