use super::{Failure, Language, Orchestrator, CHAT_MAX_TOKENS, DEFAULT_TARGET_LANGUAGE, TEMPERATURE};
use crate::gateway::CompletionRequest;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    /// The language the client asked for, echoed back.
    pub language: String,
}

impl Orchestrator {
    /// Answer a single chat message using the persona for `language`.
    /// Unknown languages use the Chinese persona.
    pub async fn chat(&self, message: &str, language: Option<&str>) -> Result<ChatOutcome, Failure> {
        if message.trim().is_empty() {
            return Err(Failure::invalid_input("Valid message is required"));
        }

        let requested = language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_TARGET_LANGUAGE);
        let persona = Language::resolve(Some(requested));
        debug!(requested = %requested, persona = persona.name(), "Chat request");

        let request = CompletionRequest {
            system_prompt: persona.chat_prompt().to_string(),
            user_content: message.to_string(),
            model: self.model.clone(),
            temperature: TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };

        let completion = self.gateway.complete(&request).await.map_err(|e| {
            error!("Chat failed: {}", e);
            Failure::from(e)
        })?;

        Ok(ChatOutcome {
            response: completion.text,
            language: requested.to_string(),
        })
    }
}
