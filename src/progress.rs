//! Progress-callback trait for transcription events.
//!
//! Inject an [`Arc<dyn TranscriptionProgressCallback>`] via
//! [`crate::config::TranscriptionConfigBuilder::progress_callback`] to follow
//! a run as it moves through upload, readiness polling and the transcription
//! request. The `pdf2txt` binary uses it to drive a terminal spinner that
//! prints one dot per poll.
//!
//! # Example
//!
//! ```rust
//! use gemini_pdf2txt::{FileState, TranscriptionConfig, TranscriptionProgressCallback};
//! use std::sync::Arc;
//!
//! struct Dots;
//!
//! impl TranscriptionProgressCallback for Dots {
//!     fn on_poll(&self, _attempt: u32, state: &FileState) {
//!         if state.is_processing() {
//!             eprint!(".");
//!         }
//!     }
//! }
//!
//! let config = TranscriptionConfig::builder()
//!     .progress_callback(Arc::new(Dots) as Arc<dyn TranscriptionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::TranscribeError;
use crate::service::{FileHandle, FileState};
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline at each phase boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait TranscriptionProgressCallback: Send + Sync {
    /// Called just before the upload request is sent.
    fn on_upload_start(&self, path: &Path) {
        let _ = path;
    }

    /// Called once the service has accepted the file.
    fn on_uploaded(&self, handle: &FileHandle) {
        let _ = handle;
    }

    /// Called after every state query.
    ///
    /// # Arguments
    /// * `attempt` — 1-indexed number of the state query for this file
    /// * `state`   — the state the service reported
    fn on_poll(&self, attempt: u32, state: &FileState) {
        let _ = (attempt, state);
    }

    /// Called when a file has become ACTIVE.
    fn on_ready(&self, handle: &FileHandle) {
        let _ = handle;
    }

    /// Called just before the transcription exchange is sent.
    fn on_request_start(&self) {}

    /// Called when the transcription text has been received.
    ///
    /// * `text_len` — byte length of the text
    fn on_complete(&self, text_len: usize) {
        let _ = text_len;
    }

    /// Called once when the run aborts, whatever the phase.
    fn on_error(&self, error: &TranscribeError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranscriptionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranscriptionConfig`].
pub type ProgressCallback = Arc<dyn TranscriptionProgressCallback>;
