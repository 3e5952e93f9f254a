//! The transcription exchange: one conversation seeded with the file.
//!
//! ## Message layout
//!
//! 1. **History** — a single user turn whose only part is the file reference
//! 2. **Instruction** — the fixed transcription instruction, sent as the new turn
//!
//! No retry and no post-processing: the text comes back byte-for-byte as the
//! model produced it.

use crate::config::GenerationSettings;
use crate::error::TranscribeError;
use crate::service::{Completion, Content, DocumentService, FileHandle};
use tracing::debug;

/// Ask the service to transcribe the file behind `handle`.
///
/// `handle` must be `ACTIVE`; anything else is refused locally with
/// [`TranscribeError::NotReady`] before any request is sent.
pub async fn request_transcription(
    service: &dyn DocumentService,
    handle: &FileHandle,
    instruction: &str,
    settings: &GenerationSettings,
) -> Result<Completion, TranscribeError> {
    if !handle.state.is_active() {
        return Err(TranscribeError::NotReady {
            name: handle.name.clone(),
            state: handle.state.to_string(),
        });
    }

    let history = [Content::user_file(handle)];
    let completion = service
        .converse(&history, instruction, settings)
        .await
        .map_err(TranscribeError::into_request_phase)?;

    if completion.text.is_empty() {
        return Err(TranscribeError::EmptyResponse {
            finish_reason: completion.finish_reason,
        });
    }

    debug!(
        "{}: {} input tokens, {} output tokens, finish reason {:?}",
        handle.name, completion.input_tokens, completion.output_tokens, completion.finish_reason
    );
    Ok(completion)
}
