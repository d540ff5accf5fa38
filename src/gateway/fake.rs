use super::{CompletionRequest, CompletionResult, GatewayError, ModelGateway};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every request and answers with a fixed reply or a status error.
pub(crate) struct RecordingGateway {
    reply: Result<String, u16>,
    pub(crate) calls: Mutex<Vec<CompletionRequest>>,
}

impl RecordingGateway {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for RecordingGateway {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(CompletionResult { text: text.clone() }),
            Err(status) => Err(GatewayError::Status {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}
