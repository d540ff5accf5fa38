#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use transchat::gateway::{CompletionRequest, CompletionResult, GatewayError, ModelGateway};
use transchat::orchestrator::Orchestrator;
use transchat::server::{self, AppState};
use transchat::upload::UploadStorage;

pub const BOUNDARY: &str = "transchat-test-boundary";

/// Answers every completion with a fixed reply, or fails with a status.
pub struct FakeGateway {
    reply: Result<String, u16>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeGateway {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for FakeGateway {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(CompletionResult { text: text.clone() }),
            Err(status) => Err(GatewayError::Status {
                status: *status,
                body: "upstream exploded".to_string(),
            }),
        }
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub gateway: Arc<FakeGateway>,
    pub upload_dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new(gateway: Arc<FakeGateway>) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let state = AppState {
            orchestrator: Orchestrator::new(gateway.clone(), "test-model"),
            storage: UploadStorage::new(upload_dir.path().to_str().unwrap()).unwrap(),
        };
        Self {
            router: server::router(state, true),
            gateway,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (u16, serde_json::Value) {
        let response: Response<Body> = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    /// Files left behind in the upload directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

pub enum Part<'a> {
    File { name: &'a str, data: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File { name, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
