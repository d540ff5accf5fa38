use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::orchestrator::{ChatOutcome, Failure, FailureKind, TranslateOutcome};
use crate::upload::{SupportedType, TempUpload, MAX_UPLOAD_BYTES, MAX_UPLOAD_FILES};
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

/// `POST /api/translate`: multipart with `file` and optional `targetLanguage`.
pub async fn translate_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<TranslateOutcome>> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::translate(Failure::missing_file()));
    };

    let mut upload: Option<TempUpload> = None;
    let mut target_language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, None))? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let Some(staged) = stage_file(&state, field).await? else {
                    continue;
                };
                if upload.is_some() {
                    // `staged` is dropped here, which removes it from disk.
                    return Err(ApiError::translate(Failure::invalid_input(format!(
                        "Only {} file may be uploaded per request",
                        MAX_UPLOAD_FILES
                    ))));
                }
                upload = Some(staged);
            }
            Some("targetLanguage") => {
                target_language = Some(field.text().await.map_err(|e| multipart_error(e, None))?);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::translate(Failure::missing_file()))?;
    let outcome = state
        .orchestrator
        .translate(upload, target_language.as_deref())
        .await
        .map_err(ApiError::translate)?;
    Ok(Json(outcome))
}

/// Validate and stage one `file` part. `None` means the browser sent an
/// empty file input.
async fn stage_file(state: &AppState, field: Field<'_>) -> ApiResult<Option<TempUpload>> {
    let original_name = match field.file_name() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => return Ok(None),
    };

    let declared_type = SupportedType::from_file_name(&original_name).ok_or_else(|| {
        ApiError::translate(Failure::new(
            FailureKind::UnsupportedType,
            format!(
                "Unsupported file type: '{}'. Supported types: {}",
                original_name,
                SupportedType::allowed_list()
            ),
        ))
    })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| multipart_error(e, Some(&original_name)))?;
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(too_large(Some(&original_name)));
    }

    let staged = state
        .storage
        .store(&original_name, declared_type, &data)
        .await
        .map_err(|e| {
            warn!(file = %original_name, "Failed to stage upload: {:#}", e);
            ApiError::translate(Failure::unknown("Failed to store uploaded file"))
        })?;
    Ok(Some(staged))
}

/// `name` is the client's file name when the oversized part has been
/// identified, `None` when the body limit tripped before that.
fn too_large(name: Option<&str>) -> ApiError {
    let limit_mb = MAX_UPLOAD_BYTES / (1024 * 1024);
    let message = match name {
        Some(name) => format!("File '{}' is too large. Maximum size is {}MB.", name, limit_mb),
        None => format!("Upload is too large. Maximum size is {}MB.", limit_mb),
    };
    ApiError::translate(Failure::invalid_input(message)).with_status(StatusCode::PAYLOAD_TOO_LARGE)
}

fn multipart_error(err: MultipartError, name: Option<&str>) -> ApiError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(name);
    }
    ApiError::translate(Failure::invalid_input(format!(
        "Failed to read form data: {}",
        err.body_text()
    )))
    .with_status(status)
}

/// `POST /api/chat`: `{message, language?}`.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ChatOutcome>> {
    let invalid = || ApiError::chat(Failure::invalid_input("Valid message is required"));

    let Json(body) = payload.map_err(|_| invalid())?;
    let message = body.get("message").and_then(Value::as_str).ok_or_else(invalid)?;
    let language = body.get("language").and_then(Value::as_str);

    let outcome = state
        .orchestrator
        .chat(message, language)
        .await
        .map_err(ApiError::chat)?;
    Ok(Json(outcome))
}

/// `GET /health`: liveness only, no dependencies are checked.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "services": {
            "fileTranslation": "active",
            "chat": "active",
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
