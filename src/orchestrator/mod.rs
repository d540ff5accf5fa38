//! Request orchestration: composes extraction and the model gateway into the
//! translate and chat operations, and shapes their results and failures.

mod chat;
pub mod error;
pub mod prompts;
mod translate;

use crate::gateway::ModelGateway;
use std::sync::Arc;

pub use chat::ChatOutcome;
pub use error::{Failure, FailureKind};
pub use prompts::Language;
pub use translate::{truncate_chars, TranslateOutcome};

/// Characters of extracted text forwarded for translation.
pub const TRANSLATE_INPUT_CHAR_LIMIT: usize = 2000;

/// Completion budget for document translation.
pub const TRANSLATE_MAX_TOKENS: u32 = 2048;

/// Completion budget for chat replies.
pub const CHAT_MAX_TOKENS: u32 = 1024;

pub const TEMPERATURE: f32 = 0.7;

/// Target language when the client does not name one.
pub const DEFAULT_TARGET_LANGUAGE: &str = "Chinese";

/// Stateless between requests; cheap to clone into handlers.
#[derive(Clone)]
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    model: String,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }
}
