//! Result types returned by the transcription entry points.

use crate::service::FileHandle;
use serde::{Deserialize, Serialize};

/// A finished transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionOutput {
    /// Text returned by the model, exactly as received.
    pub text: String,
    /// The remote file as last observed (state is always ACTIVE here).
    pub file: FileHandle,
    pub stats: TranscriptionStats,
}

/// Timing and usage figures for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionStats {
    /// State queries issued while waiting for the file.
    pub poll_attempts: u32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Why generation stopped, when the service says.
    pub finish_reason: Option<String>,
    pub upload_duration_ms: u64,
    pub wait_duration_ms: u64,
    pub request_duration_ms: u64,
    pub total_duration_ms: u64,
}
