use super::{
    prompts, Failure, Orchestrator, DEFAULT_TARGET_LANGUAGE, TEMPERATURE,
    TRANSLATE_INPUT_CHAR_LIMIT, TRANSLATE_MAX_TOKENS,
};
use crate::gateway::CompletionRequest;
use crate::upload::{extract_text, TempUpload, UploadedFile};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateOutcome {
    pub success: bool,
    /// Extracted text after truncation.
    pub original_text: String,
    pub translated_text: String,
    pub language: String,
    /// Length of the extracted text before truncation, in characters.
    pub original_length: usize,
}

/// First `limit` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl Orchestrator {
    /// Extract, truncate and translate a staged upload. The upload is removed
    /// before this returns, whatever the outcome.
    pub async fn translate(
        &self,
        upload: TempUpload,
        target_language: Option<&str>,
    ) -> Result<TranslateOutcome, Failure> {
        let language = target_language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_TARGET_LANGUAGE)
            .to_string();

        let result = self.run_translation(upload.file(), language).await;
        upload.discard().await;

        if let Err(failure) = &result {
            error!(kind = failure.kind.as_str(), "Translation failed: {}", failure.message);
        }
        result
    }

    async fn run_translation(
        &self,
        file: &UploadedFile,
        language: String,
    ) -> Result<TranslateOutcome, Failure> {
        let text = extract_text(&file.path, &file.original_name).await?;
        let original_length = text.chars().count();
        let original_text = truncate_chars(&text, TRANSLATE_INPUT_CHAR_LIMIT).to_string();

        info!(
            file = %file.original_name,
            chars = original_length,
            truncated = original_length > TRANSLATE_INPUT_CHAR_LIMIT,
            language = %language,
            "Translating document"
        );

        let request = CompletionRequest {
            system_prompt: prompts::translation_prompt(&language),
            user_content: original_text.clone(),
            model: self.model.clone(),
            temperature: TEMPERATURE,
            max_tokens: TRANSLATE_MAX_TOKENS,
        };
        let completion = self.gateway.complete(&request).await?;

        Ok(TranslateOutcome {
            success: true,
            original_text,
            translated_text: completion.text,
            language,
            original_length,
        })
    }
}
