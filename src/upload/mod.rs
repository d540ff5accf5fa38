//! Uploads: staging, cleanup and text extraction.
//!
//! Files arrive over multipart, are written to a scratch directory under a
//! generated name, have their text extracted and are removed again before the
//! request completes.

pub mod extract;
pub mod schema;
pub mod storage;

pub use extract::{extract_text, ExtractError};
pub use schema::{SupportedType, UploadedFile};
pub use storage::{TempUpload, UploadStorage};

/// Largest accepted file, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Files accepted per translate request.
pub const MAX_UPLOAD_FILES: usize = 1;
