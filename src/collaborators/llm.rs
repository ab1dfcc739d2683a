//! Classifier/generator collaborator.
//!
//! The workflow depends only on the `ChatModel` seam: given a system
//! instruction, a model name, a temperature, and message content, it
//! returns a normalized uppercase single-token classification or a
//! free-text generation. `OllamaChatModel` is the production
//! implementation against an Ollama-compatible `/api/generate` endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::prompts::PromptSpec;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("cannot reach model server: {0}")]
    Connection(String),

    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("model server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("cannot parse model response: {0}")]
    ResponseParsing(String),
}

/// Normalized single-token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    OnTopic,
    OffTopic,
}

impl Classification {
    /// Normalize a raw model reply. Only an exact `OFF_TOPIC` (after
    /// trimming and uppercasing) counts as off-topic; anything else is
    /// treated as on-topic.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().to_uppercase() == "OFF_TOPIC" {
            Classification::OffTopic
        } else {
            Classification::OnTopic
        }
    }
}

/// Trait for LLM classification and generation within the workflow.
pub trait ChatModel: Send + Sync {
    fn generate(&self, spec: &PromptSpec, content: &str) -> Result<String, LlmError>;

    fn classify(&self, spec: &PromptSpec, content: &str) -> Result<Classification, LlmError> {
        Ok(Classification::parse(&self.generate(spec, content)?))
    }
}

// ═══════════════════════════════════════════════════════════
// Ollama-backed implementation
// ═══════════════════════════════════════════════════════════

/// Blocking HTTP client for an Ollama-compatible model server.
///
/// Blocking is deliberate: workflow runs are synchronous end-to-end and
/// execute on a blocking task, treating model latency as ordinary
/// synchronous latency.
pub struct OllamaChatModel {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaChatModel {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl ChatModel for OllamaChatModel {
    fn generate(&self, spec: &PromptSpec, content: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: spec.model,
            prompt: content,
            system: spec.system,
            stream: false,
            options: GenerateOptions {
                temperature: spec.temperature,
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response.trim().to_string())
    }
}
