use crate::gateway::GatewayError;
use crate::upload::ExtractError;
use serde::Serialize;
use thiserror::Error;

/// Machine-checkable failure categories reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingFile,
    InvalidInput,
    UnsupportedType,
    EmptyContent,
    TransportFailure,
    UnknownFailure,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::InvalidInput => "invalid_input",
            Self::UnsupportedType => "unsupported_type",
            Self::EmptyContent => "empty_content",
            Self::TransportFailure => "transport_failure",
            Self::UnknownFailure => "unknown_failure",
        }
    }
}

/// A failed operation: its kind plus a message safe to show the user.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_file() -> Self {
        Self::new(FailureKind::MissingFile, "No file uploaded")
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FailureKind::UnknownFailure, message)
    }
}

impl From<ExtractError> for Failure {
    fn from(err: ExtractError) -> Self {
        let kind = match &err {
            ExtractError::UnsupportedType { .. } => FailureKind::UnsupportedType,
            ExtractError::EmptyContent { .. } => FailureKind::EmptyContent,
            ExtractError::Io { .. } | ExtractError::Pdf { .. } => FailureKind::UnknownFailure,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<GatewayError> for Failure {
    fn from(err: GatewayError) -> Self {
        Self::new(FailureKind::TransportFailure, err.to_string())
    }
}
