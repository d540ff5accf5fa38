use super::schema::{SupportedType, UploadedFile};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Stages uploaded bytes in a scratch directory for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    base_dir: PathBuf,
}

impl UploadStorage {
    pub fn new(base_dir: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(base_dir).to_string();
        Ok(Self {
            base_dir: PathBuf::from(expanded),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write the bytes under a collision-free name and hand back a guard
    /// that owns the file until it is discarded.
    pub async fn store(
        &self,
        original_name: &str,
        declared_type: SupportedType,
        data: &[u8],
    ) -> Result<TempUpload> {
        self.store_as(&unique_name(declared_type), original_name, declared_type, data)
            .await
    }

    async fn store_as(
        &self,
        stored_name: &str,
        original_name: &str,
        declared_type: SupportedType,
        data: &[u8],
    ) -> Result<TempUpload> {
        fs::create_dir_all(&self.base_dir)
            .await
            .context("Failed to create upload directory")?;

        // Guarded before the first byte lands on disk.
        let upload = TempUpload {
            file: UploadedFile {
                path: self.base_dir.join(stored_name),
                original_name: original_name.to_string(),
                declared_type,
                size_bytes: data.len() as u64,
            },
            removed: false,
        };

        if let Err(e) = fs::write(upload.path(), data).await {
            tracing::warn!(
                file = %original_name,
                error = %e,
                "Failed to write staged upload, removing partial file"
            );
            upload.discard().await;
            return Err(e).context("Failed to write uploaded file");
        }

        tracing::info!(
            file = %original_name,
            bytes = data.len(),
            "Staged upload"
        );
        Ok(upload)
    }
}

/// `<unix-millis>-<uuid>.<ext>`; the user's file name never reaches the disk.
fn unique_name(declared_type: SupportedType) -> String {
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        declared_type.extension()
    )
}

/// A staged upload that is deleted exactly once: by [`TempUpload::discard`]
/// on normal paths, or by `Drop` if the owning future is cancelled.
#[derive(Debug)]
pub struct TempUpload {
    file: UploadedFile,
    removed: bool,
}

impl TempUpload {
    pub fn file(&self) -> &UploadedFile {
        &self.file
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Remove the staged file. Failures are logged and swallowed.
    pub async fn discard(mut self) {
        self.removed = true;
        if let Err(e) = fs::remove_file(&self.file.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    file = %self.file.original_name,
                    error = %e,
                    "Failed to remove staged upload"
                );
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.file.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    file = %self.file.original_name,
                    error = %e,
                    "Failed to remove staged upload on drop"
                );
            }
        }
    }
}
