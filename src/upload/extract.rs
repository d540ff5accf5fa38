use super::schema::SupportedType;
use std::path::Path;
use thiserror::Error;

/// Reasons text could not be pulled out of an upload. Messages only ever
/// mention the user-supplied file name, never the staged path.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: '{name}'. Supported types: {allowed}")]
    UnsupportedType { name: String, allowed: String },

    #[error("No readable text found in '{name}'")]
    EmptyContent { name: String },

    #[error("Failed to read '{name}': {kind}")]
    Io {
        name: String,
        kind: std::io::ErrorKind,
    },

    #[error("Failed to parse PDF '{name}': {reason}")]
    Pdf { name: String, reason: String },
}

/// Extract the text content of a staged upload.
///
/// The type is resolved from `original_name` through the shared allow-list,
/// so a file that slipped past the upload boundary is still rejected here.
/// Read-only: deleting the file is the caller's job.
pub async fn extract_text(path: &Path, original_name: &str) -> Result<String, ExtractError> {
    let file_type =
        SupportedType::from_file_name(original_name).ok_or_else(|| ExtractError::UnsupportedType {
            name: original_name.to_string(),
            allowed: SupportedType::allowed_list(),
        })?;

    let data = tokio::fs::read(path).await.map_err(|e| ExtractError::Io {
        name: original_name.to_string(),
        kind: e.kind(),
    })?;

    let text = match file_type {
        // Plain text: lossy UTF-8 decode
        SupportedType::Txt => String::from_utf8_lossy(&data).into_owned(),
        SupportedType::Pdf => extract_pdf(data, original_name).await?,
    };

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyContent {
            name: original_name.to_string(),
        });
    }

    tracing::debug!(file = %original_name, chars = text.chars().count(), "Extracted text");
    Ok(text)
}

#[cfg(feature = "pdf")]
async fn extract_pdf(data: Vec<u8>, name: &str) -> Result<String, ExtractError> {
    // The parser is CPU-bound and may panic on malformed input; the blocking
    // pool turns a panic into a JoinError.
    let joined = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
    })
    .await;
    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(reason)) => Err(ExtractError::Pdf {
            name: name.to_string(),
            reason,
        }),
        Err(_) => Err(ExtractError::Pdf {
            name: name.to_string(),
            reason: "document could not be parsed".to_string(),
        }),
    }
}

#[cfg(not(feature = "pdf"))]
async fn extract_pdf(data: Vec<u8>, name: &str) -> Result<String, ExtractError> {
    let _ = data;
    Err(ExtractError::Pdf {
        name: name.to_string(),
        reason: "PDF support is not enabled in this build".to_string(),
    })
}
