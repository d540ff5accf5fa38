use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File types accepted for translation. The only allow-list in the crate:
/// the upload boundary and the extractor both resolve through
/// [`SupportedType::from_file_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedType {
    Pdf,
    Txt,
}

impl SupportedType {
    pub const ALL: [SupportedType; 2] = [SupportedType::Pdf, SupportedType::Txt];

    /// Resolve the type from a user-supplied file name (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }

    /// Human-readable list, e.g. `.pdf, .txt`.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|t| format!(".{}", t.extension()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Metadata for a file received over multipart and staged on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Server-side path of the staged copy. Never sent to clients.
    #[serde(skip)]
    pub path: PathBuf,
    pub original_name: String,
    pub declared_type: SupportedType,
    pub size_bytes: u64,
}
