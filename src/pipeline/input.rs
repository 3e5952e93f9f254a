//! Input resolution: turn a path or an in-memory upload into a readable PDF file.
//!
//! This is the type filter in front of ingestion. Zero-length files and files
//! that do not start with the `%PDF` magic bytes are rejected here, so the
//! service is never asked to upload them.
//!
//! In-memory uploads ([`UploadedBlob`]) are written into a `TempDir` under
//! their own file name; the directory is removed when the [`ResolvedInput`]
//! is dropped, even on panic.

use crate::config::PDF_MIME_TYPE;
use crate::error::TranscribeError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";
const DEFAULT_UPLOAD_NAME: &str = "uploaded_file.pdf";

/// Raw bytes of a user-supplied file plus its declared media type.
#[derive(Debug, Clone)]
pub struct UploadedBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Original file name, used as the remote display name.
    pub file_name: Option<String>,
}

impl UploadedBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    /// Bytes declared as `application/pdf`.
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self::new(bytes, PDF_MIME_TYPE)
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// A PDF ready for upload: the caller's file or a persisted blob.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input arrived as bytes and was written to a temp directory.
    /// The `TempDir` is kept alive until the upload has completed.
    Persisted { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Persisted { path, .. } => path,
        }
    }
}

/// `application/pdf`, ignoring case and parameters.
pub fn is_pdf_media_type(mime: &str) -> bool {
    mime.split(';')
        .next()
        .map(|m| m.trim().eq_ignore_ascii_case(PDF_MIME_TYPE))
        .unwrap_or(false)
}

/// Validate a local file: it must exist, be readable, be non-empty and start
/// with `%PDF`.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<ResolvedInput, TranscribeError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(TranscribeError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(TranscribeError::PermissionDenied { path });
        }
        Err(_) => return Err(TranscribeError::FileNotFound { path }),
    };

    let mut head = Vec::with_capacity(PDF_MAGIC.len());
    file.by_ref()
        .take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut head)
        .map_err(|e| TranscribeError::Internal(format!("Failed to read {}: {e}", path.display())))?;
    check_pdf_head(&path, &head)?;

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Validate an in-memory upload and write it to a transient file.
pub fn persist_blob(blob: UploadedBlob) -> Result<ResolvedInput, TranscribeError> {
    let file_name = blob
        .file_name
        .as_deref()
        .and_then(|n| Path::new(n).file_name())
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());

    if !is_pdf_media_type(&blob.mime_type) {
        return Err(TranscribeError::UnsupportedMediaType {
            mime_type: blob.mime_type,
        });
    }
    check_pdf_head(Path::new(&file_name), &blob.bytes)?;

    let temp_dir = TempDir::new().map_err(|e| TranscribeError::Internal(format!("tempdir: {e}")))?;
    let path = temp_dir.path().join(&file_name);
    std::fs::write(&path, &blob.bytes)
        .map_err(|e| TranscribeError::Internal(format!("Failed to write temp file: {e}")))?;

    debug!("Persisted {} bytes to {}", blob.bytes.len(), path.display());
    Ok(ResolvedInput::Persisted {
        path,
        _temp_dir: temp_dir,
    })
}

fn check_pdf_head(path: &Path, head: &[u8]) -> Result<(), TranscribeError> {
    if head.is_empty() {
        return Err(TranscribeError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    if !head.starts_with(PDF_MAGIC) {
        return Err(TranscribeError::NotAPdf {
            path: path.to_path_buf(),
            magic: head.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }
    Ok(())
}
