//! Transcription entry points.
//!
//! [`transcribe`] runs the whole pipeline for a PDF on disk;
//! [`transcribe_blob`] does the same for bytes held in memory;
//! [`transcribe_to_file`] additionally saves the text; [`transcribe_sync`]
//! is the blocking wrapper. Every step is awaited in order: upload, wait,
//! request. Nothing runs concurrently and nothing is retried.

use crate::config::TranscriptionConfig;
use crate::error::TranscribeError;
use crate::output::{TranscriptionOutput, TranscriptionStats};
use crate::pipeline::input::{self, ResolvedInput, UploadedBlob};
use crate::pipeline::{ingest, poll, request};
use crate::service::DocumentService;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Transcribe a local PDF file to plain text.
///
/// # Errors
/// - input: file not found, unreadable, empty, or not a PDF (nothing is uploaded)
/// - transport: upload or state query failed
/// - processing: the file ended in a state other than ACTIVE, or the poll cap was hit
/// - request: the exchange failed or returned no text
pub async fn transcribe(
    input_path: impl AsRef<Path>,
    service: &dyn DocumentService,
    config: &TranscriptionConfig,
) -> Result<TranscriptionOutput, TranscribeError> {
    let result = match input::resolve_local(input_path) {
        Ok(resolved) => run(&resolved, service, config).await,
        Err(e) => Err(e),
    };
    notify_on_error(result, config)
}

/// Transcribe an in-memory upload.
///
/// The bytes are validated (declared type, non-empty, `%PDF` magic) and
/// written to a transient file that is deleted when this function returns.
pub async fn transcribe_blob(
    blob: UploadedBlob,
    service: &dyn DocumentService,
    config: &TranscriptionConfig,
) -> Result<TranscriptionOutput, TranscribeError> {
    let result = match input::persist_blob(blob) {
        Ok(resolved) => run(&resolved, service, config).await,
        Err(e) => Err(e),
    };
    notify_on_error(result, config)
}

/// Transcribe a PDF and write the text to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn transcribe_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    service: &dyn DocumentService,
    config: &TranscriptionConfig,
) -> Result<TranscriptionOutput, TranscribeError> {
    let output = transcribe(input_path, service, config).await?;
    notify_on_error(write_atomic(output_path.as_ref(), &output.text).await, config)?;
    Ok(output)
}

/// Synchronous wrapper around [`transcribe`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn transcribe_sync(
    input_path: impl AsRef<Path>,
    service: &dyn DocumentService,
    config: &TranscriptionConfig,
) -> Result<TranscriptionOutput, TranscribeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranscribeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(transcribe(input_path, service, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    resolved: &ResolvedInput,
    service: &dyn DocumentService,
    config: &TranscriptionConfig,
) -> Result<TranscriptionOutput, TranscribeError> {
    let total_start = Instant::now();
    let progress = config.progress_callback.as_ref();
    info!("Starting transcription: {}", resolved.path().display());

    // ── Step 1: Upload ───────────────────────────────────────────────────
    let upload_start = Instant::now();
    let uploaded =
        ingest::upload_document(service, resolved.path(), Some(&config.mime_type), progress)
            .await?;
    let upload_duration_ms = upload_start.elapsed().as_millis() as u64;

    // ── Step 2: Wait for ACTIVE ──────────────────────────────────────────
    let wait_start = Instant::now();
    let ready = poll::wait_for_file_active(
        service,
        &uploaded.name,
        &config.poll,
        config.clock.as_ref(),
        progress,
    )
    .await?;
    let wait_duration_ms = wait_start.elapsed().as_millis() as u64;

    // ── Step 3: Transcription request ────────────────────────────────────
    if let Some(cb) = progress {
        cb.on_request_start();
    }
    let request_start = Instant::now();
    let completion = request::request_transcription(
        service,
        &ready.handle,
        config.instruction(),
        &config.generation,
    )
    .await?;
    let request_duration_ms = request_start.elapsed().as_millis() as u64;

    if let Some(cb) = progress {
        cb.on_complete(completion.text.len());
    }

    let stats = TranscriptionStats {
        poll_attempts: ready.attempts,
        input_tokens: completion.input_tokens,
        output_tokens: completion.output_tokens,
        finish_reason: completion.finish_reason,
        upload_duration_ms,
        wait_duration_ms,
        request_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Transcription complete: {} chars, {} state queries, {}ms total",
        completion.text.len(),
        stats.poll_attempts,
        stats.total_duration_ms
    );

    Ok(TranscriptionOutput {
        text: completion.text,
        file: ready.handle,
        stats,
    })
}

fn notify_on_error<T>(
    result: Result<T, TranscribeError>,
    config: &TranscriptionConfig,
) -> Result<T, TranscribeError> {
    if let (Err(e), Some(cb)) = (&result, config.progress_callback.as_ref()) {
        cb.on_error(e);
    }
    result
}

async fn write_atomic(path: &Path, text: &str) -> Result<(), TranscribeError> {
    let write_err = |e| TranscribeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, text).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
