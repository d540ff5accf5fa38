//! HTTP surface: `/api/translate`, `/api/chat` and `/health`.

pub mod error;
mod handlers;

use crate::config::Config;
use crate::gateway::OpenAiCompatGateway;
use crate::orchestrator::Orchestrator;
use crate::upload::{UploadStorage, MAX_UPLOAD_BYTES};
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::{ApiError, ApiResult, Operation, TRANSLATE_SUGGESTION};
pub use handlers::{chat_handler, health_handler, translate_handler};

/// Headroom on top of the file limit for multipart boundaries and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Per-request state. Holds no mutable data shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub storage: UploadStorage,
}

pub fn router(state: AppState, cors_allow_any: bool) -> Router {
    let mut app = Router::new()
        .route("/api/translate", post(translate_handler))
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Build the gateway, orchestrator and storage from `config`.
pub fn build_state(config: &Config) -> Result<AppState> {
    let gateway = OpenAiCompatGateway::new(
        &config.model.api_url,
        config.model.api_key.clone(),
        config.request_timeout(),
    )
    .context("Failed to build model API client")?;
    let orchestrator = Orchestrator::new(Arc::new(gateway), config.model.model.clone());
    let storage = UploadStorage::new(&config.uploads.dir)?;
    Ok(AppState {
        orchestrator,
        storage,
    })
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    if !config.has_api_key() {
        warn!("No API key configured (set TRANSCHAT_API_KEY); chat and translation requests will fail");
    }

    let state = build_state(&config)?;
    info!(
        model = %state.orchestrator.model(),
        gateway = %state.orchestrator.gateway_name(),
        upload_dir = %state.storage.base_dir().display(),
        timeout_secs = config.model.request_timeout_secs,
        "Service configured"
    );

    let app = router(state, config.server.cors_allow_any);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
