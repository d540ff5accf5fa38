use crate::orchestrator::{Failure, FailureKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Advice attached to every translation failure.
pub const TRANSLATE_SUGGESTION: &str =
    "Please make sure the file is a readable PDF or TXT document under 10MB, then try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Translate,
    Chat,
}

/// A failure rendered as the JSON envelope of the operation it came from.
#[derive(Debug)]
pub struct ApiError {
    pub operation: Operation,
    pub failure: Failure,
    pub status: StatusCode,
}

impl ApiError {
    pub fn translate(failure: Failure) -> Self {
        Self::new(Operation::Translate, failure)
    }

    pub fn chat(failure: Failure) -> Self {
        Self::new(Operation::Chat, failure)
    }

    fn new(operation: Operation, failure: Failure) -> Self {
        let status = match failure.kind {
            FailureKind::MissingFile | FailureKind::InvalidInput | FailureKind::UnsupportedType => {
                StatusCode::BAD_REQUEST
            }
            FailureKind::EmptyContent
            | FailureKind::TransportFailure
            | FailureKind::UnknownFailure => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            operation,
            failure,
            status,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.failure.kind;
        let body = match (self.operation, kind) {
            (Operation::Translate, FailureKind::MissingFile) => json!({
                "error": "No file uploaded",
                "kind": kind,
            }),
            (Operation::Translate, _) => json!({
                "error": "Translation failed",
                "kind": kind,
                "message": self.failure.message,
                "suggestion": TRANSLATE_SUGGESTION,
            }),
            (Operation::Chat, FailureKind::InvalidInput) => json!({
                "error": "Valid message is required",
                "kind": kind,
            }),
            (Operation::Chat, _) => json!({
                "error": "Chat failed",
                "kind": kind,
                "message": self.failure.message,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
