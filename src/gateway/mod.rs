//! Model gateway: the single seam between this service and the hosted
//! chat-completion model.

pub mod openai;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use openai::OpenAiCompatGateway;

/// One system + user exchange. Numeric parameters are forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_content: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Generated text. An empty string is a valid result, not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Model API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends a prompt to a hosted model and returns the generated text.
///
/// Implementations are single-shot: no retries, no caching.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError>;
}
