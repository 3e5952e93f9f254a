//! Ingestion: hand a local file to the service and get a [`FileHandle`] back.
//!
//! Single attempt. Whatever the service or the network says goes straight
//! back to the caller.

use crate::error::TranscribeError;
use crate::progress::ProgressCallback;
use crate::service::{DocumentService, FileHandle};
use std::path::Path;
use tracing::info;

/// Upload the file at `path`, declaring `mime_type` when given.
pub async fn upload_document(
    service: &dyn DocumentService,
    path: &Path,
    mime_type: Option<&str>,
    progress: Option<&ProgressCallback>,
) -> Result<FileHandle, TranscribeError> {
    if let Some(cb) = progress {
        cb.on_upload_start(path);
    }

    let handle = service.upload(path, mime_type).await?;
    info!("Uploaded file '{}' as: {}", handle.display_name, handle.uri);

    if let Some(cb) = progress {
        cb.on_uploaded(&handle);
    }
    Ok(handle)
}
