//! Error type for the gemini-pdf2txt library.
//!
//! Every failure is fatal. The pipeline is strictly fail-fast: an upload that
//! cannot reach the service, a file that the service refuses to process, or a
//! transcription exchange that yields no text all abort the run and surface
//! here as a [`TranscribeError`]. There is no partial-result path.
//!
//! The variants fall into three families, queried with
//! [`TranscribeError::is_transport`], [`TranscribeError::is_processing_failure`]
//! and [`TranscribeError::is_request_failure`]:
//!
//! * **transport** — the upload or state query could not reach the service
//!   or was rejected by it (network, auth, quota);
//! * **processing** — the uploaded file reached a terminal state other than
//!   `ACTIVE`, or never left `PROCESSING` within the configured poll cap;
//! * **request** — the transcription exchange failed or produced no text.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the gemini-pdf2txt library.
#[derive(Debug, Error)]
pub enum TranscribeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input is zero bytes long.
    #[error("File '{path}' is empty")]
    EmptyFile { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// An in-memory upload declared a media type other than `application/pdf`.
    #[error("Unsupported media type '{mime_type}': only application/pdf is accepted")]
    UnsupportedMediaType { mime_type: String },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The service could not be reached (DNS, TLS, connection reset, timeout).
    #[error("Could not reach the Gemini API during {operation}: {detail}")]
    Transport { operation: String, detail: String },

    /// The service rejected the API key (401/403).
    #[error("Authentication error from the Gemini API: {detail}\nCheck GEMINI_API_KEY.")]
    AuthError { detail: String },

    /// The service returned HTTP 429.
    #[error("Rate limit exceeded on the Gemini API")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// Any other non-success HTTP status.
    #[error("Gemini API error (HTTP {status}) during {operation}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    /// The service answered 2xx but the body could not be understood.
    #[error("Unexpected response from the Gemini API during {operation}: {detail}")]
    InvalidResponse { operation: String, detail: String },

    // ── Processing errors ─────────────────────────────────────────────────
    /// The uploaded file reached a terminal state other than ACTIVE.
    #[error("File {name} failed to process (state: {state})")]
    ProcessingFailed { name: String, state: String },

    /// The configured poll cap was reached while the file was still PROCESSING.
    #[error("File {name} still PROCESSING after {attempts} state queries ({waited_secs}s waited)")]
    PollTimeout {
        name: String,
        attempts: u32,
        waited_secs: u64,
    },

    // ── Request errors ────────────────────────────────────────────────────
    /// A transcription was requested for a file that is not ACTIVE.
    #[error("File {name} is not ready for transcription (state: {state})")]
    NotReady { name: String, state: String },

    /// The exchange succeeded but the response carried no text.
    #[error("The model returned no text{}", finish_reason_suffix(.finish_reason))]
    EmptyResponse { finish_reason: Option<String> },

    /// The prompt was blocked by the service's safety filters.
    #[error("The request was blocked by the Gemini API: {reason}")]
    Blocked { reason: String },

    /// The transcription exchange could not be completed (network, auth,
    /// quota, HTTP status or unreadable body).
    #[error("Transcription request failed: {source}")]
    Request {
        #[source]
        source: Box<TranscribeError>,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key was supplied.
    #[error("Gemini API is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn finish_reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (finish reason: {r})"))
        .unwrap_or_default()
}

impl TranscribeError {
    /// Upload or state query could not reach the service, or was refused by it.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::AuthError { .. }
                | Self::RateLimitExceeded { .. }
                | Self::Api { .. }
                | Self::InvalidResponse { .. }
        )
    }

    /// The remote file never became usable.
    pub fn is_processing_failure(&self) -> bool {
        matches!(self, Self::ProcessingFailed { .. } | Self::PollTimeout { .. })
    }

    /// The transcription exchange itself failed.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::NotReady { .. }
                | Self::EmptyResponse { .. }
                | Self::Blocked { .. }
                | Self::Request { .. }
        )
    }

    /// Re-tag a transport-class error raised during the transcription
    /// exchange as a request failure. Other errors pass through unchanged.
    pub fn into_request_phase(self) -> Self {
        if self.is_transport() {
            Self::Request {
                source: Box::new(self),
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_failed_names_file_and_state() {
        let e = TranscribeError::ProcessingFailed {
            name: "files/abc123".into(),
            state: "FAILED".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("files/abc123"), "got: {msg}");
        assert!(msg.contains("FAILED"), "got: {msg}");
        assert!(e.is_processing_failure());
        assert!(!e.is_transport());
    }

    #[test]
    fn empty_response_display_with_reason() {
        let e = TranscribeError::EmptyResponse {
            finish_reason: Some("MAX_TOKENS".into()),
        };
        assert!(e.to_string().contains("MAX_TOKENS"));
        assert!(e.is_request_failure());
    }

    #[test]
    fn empty_response_display_without_reason() {
        let e = TranscribeError::EmptyResponse {
            finish_reason: None,
        };
        assert_eq!(e.to_string(), "The model returned no text");
    }

    #[test]
    fn transport_error_during_exchange_becomes_request_failure() {
        let e = TranscribeError::Api {
            operation: "transcription request".into(),
            status: 500,
            message: "INTERNAL: internal".into(),
        }
        .into_request_phase();
        assert!(e.is_request_failure());
        assert!(!e.is_transport());
        assert!(e.to_string().contains("HTTP 500"));

        let blocked = TranscribeError::Blocked {
            reason: "SAFETY".into(),
        }
        .into_request_phase();
        assert!(matches!(blocked, TranscribeError::Blocked { .. }));
    }

    #[test]
    fn api_error_is_transport() {
        let e = TranscribeError::Api {
            operation: "upload".into(),
            status: 500,
            message: "backend error".into(),
        };
        assert!(e.is_transport());
        assert!(e.to_string().contains("HTTP 500"));
    }

    #[test]
    fn poll_timeout_display() {
        let e = TranscribeError::PollTimeout {
            name: "files/x".into(),
            attempts: 4,
            waited_secs: 30,
        };
        assert!(e.to_string().contains("4 state queries"));
        assert!(e.is_processing_failure());
    }
}
