use super::{CompletionRequest, CompletionResult, GatewayError, ModelGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest slice of an error body carried into a failure message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Gateway for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatGateway {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiCompatGateway {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Default)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiChoiceMessage>,
}

#[derive(Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's content out of a response body. Anything missing
/// or malformed decodes to the empty string.
fn decode_content(body: &str) -> String {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(parsed) => parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Undecodable completion body, treating as empty output");
            String::new()
        }
    }
}

#[async_trait]
impl ModelGateway for OpenAiCompatGateway {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;
        let start = Instant::now();

        let body = ApiRequest {
            model: &request.model,
            messages: [
                ApiMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ApiMessage {
                    role: "user",
                    content: &request.user_content,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %request.model, max_tokens = request.max_tokens, "Completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Completion response"
        );

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(CompletionResult {
            text: decode_content(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Canned {
        status: StatusCode,
        body: String,
        delay: Duration,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn handler(
        State(canned): State<Canned>,
        headers: axum::http::HeaderMap,
        Json(payload): Json<Value>,
    ) -> (StatusCode, String) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        canned.seen.lock().unwrap().push((auth, payload));
        tokio::time::sleep(canned.delay).await;
        (canned.status, canned.body.clone())
    }

    async fn spawn_upstream(canned: Canned) -> String {
        let app = Router::new()
            .route("/v1/chat/completions", post(handler))
            .with_state(canned);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn canned(status: StatusCode, body: &str) -> Canned {
        Canned {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "Translate into French.".into(),
            user_content: "Good morning".into(),
            model: "test-model".into(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }

    #[test]
    fn decode_handles_missing_pieces() {
        assert_eq!(decode_content(r#"{"choices":[{"message":{"content":"hi"}}]}"#), "hi");
        assert_eq!(decode_content(r#"{"choices":[]}"#), "");
        assert_eq!(decode_content(r#"{"choices":[{"message":{}}]}"#), "");
        assert_eq!(decode_content(r#"{"choices":[{}]}"#), "");
        assert_eq!(decode_content(r#"{"id":"x"}"#), "");
        assert_eq!(decode_content(""), "");
        assert_eq!(decode_content("<html>oops</html>"), "");
    }

    #[tokio::test]
    async fn sends_two_message_exchange_and_returns_text() {
        let upstream = canned(
            StatusCode::OK,
            r#"{"choices":[{"message":{"role":"assistant","content":"Bonjour"}}]}"#,
        );
        let seen = upstream.seen.clone();
        let base = spawn_upstream(upstream).await;

        let gateway =
            OpenAiCompatGateway::new(&base, Some("sk-test".into()), Duration::from_secs(5)).unwrap();
        let result = gateway.complete(&request()).await.unwrap();
        assert_eq!(result.text, "Bonjour");

        let seen = seen.lock().unwrap();
        let (auth, payload) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(
            payload["messages"],
            json!([
                {"role": "system", "content": "Translate into French."},
                {"role": "user", "content": "Good morning"}
            ])
        );
        assert_eq!(payload["model"], "test-model");
        assert_eq!(payload["max_tokens"], 2048);
        assert!((payload["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn malformed_success_body_is_empty_output() {
        let base = spawn_upstream(canned(StatusCode::OK, "not json")).await;
        let gateway =
            OpenAiCompatGateway::new(&base, Some("k".into()), Duration::from_secs(5)).unwrap();
        let result = gateway.complete(&request()).await.unwrap();
        assert_eq!(result.text, "");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let base = spawn_upstream(canned(StatusCode::UNAUTHORIZED, "bad key")).await;
        let gateway =
            OpenAiCompatGateway::new(&base, Some("k".into()), Duration::from_secs(5)).unwrap();
        match gateway.complete(&request()).await {
            Err(GatewayError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let mut slow = canned(StatusCode::OK, "{}");
        slow.delay = Duration::from_secs(2);
        let base = spawn_upstream(slow).await;
        let gateway =
            OpenAiCompatGateway::new(&base, Some("k".into()), Duration::from_millis(100)).unwrap();
        let err = gateway.complete(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let gateway =
            OpenAiCompatGateway::new("http://127.0.0.1:9", Some("  ".into()), Duration::from_secs(1))
                .unwrap();
        let err = gateway.complete(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let gateway =
            OpenAiCompatGateway::new("https://api.example.com/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.endpoint(), "https://api.example.com/chat/completions");
    }
}
