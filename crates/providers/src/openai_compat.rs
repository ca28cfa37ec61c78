//! OpenAI-compatible adapter.
//!
//! Works with a LiteLLM proxy, OpenAI itself, Ollama, vLLM, and any other
//! endpoint that follows the OpenAI chat completions contract.

use serde_json::Value;
use std::time::Duration;

use gl_domain::config::CompletionConfig;
use gl_domain::error::{Error, Result};

use crate::traits::{CompletionGateway, CompletionRequest};
use crate::util::from_reqwest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A completion gateway for any OpenAI-compatible API endpoint.
pub struct OpenAiCompatGateway {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatGateway {
    /// Create a new gateway from the deserialized completion config.
    pub fn from_config(cfg: &CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.resolve_api_key(),
            client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        builder
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire format
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn build_chat_body(req: &CompletionRequest) -> Value {
    serde_json::json!({
        "model": req.model,
        "messages": [
            { "role": "system", "content": req.system_instruction },
            { "role": "user", "content": req.input },
        ],
    })
}

/// Pull the first choice's message content out of a chat completions
/// response body.
fn parse_chat_response(resp: &Value) -> Result<String> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Gateway("response contained no message content".into()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl CompletionGateway for OpenAiCompatGateway {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let url = self.chat_url();
        let body = build_chat_body(&req);

        tracing::debug!(url = %url, model = %req.model, "chat completion request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Gateway(format!(
                "HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_response(&resp_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-1.5-flash".into(),
            system_instruction: "You are a critic.".into(),
            input: "Critique this film concept:\n\nAn outline.".into(),
        }
    }

    #[test]
    fn body_carries_model_and_both_messages() {
        let body = build_chat_body(&request());
        assert_eq!(body["model"], "gemini-1.5-flash");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a critic.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .starts_with("Critique this film concept:"));
    }

    #[test]
    fn parses_first_choice_content() {
        let resp = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "A fine outline." } }
            ]
        });
        assert_eq!(parse_chat_response(&resp).unwrap(), "A fine outline.");
    }

    #[test]
    fn missing_content_is_a_gateway_error() {
        let resp = serde_json::json!({ "choices": [] });
        let err = parse_chat_response(&resp).unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));
    }
}
