//! The document service seam: remote file handles and the capability trait.
//!
//! Everything the pipeline needs from the outside world is three calls:
//! upload a file, ask for its current state, and run one conversational
//! exchange. [`DocumentService`] names exactly those. [`crate::gemini::GeminiClient`]
//! is the production implementation; tests substitute a scripted fake.

use crate::config::GenerationSettings;
use crate::error::TranscribeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ── File state ───────────────────────────────────────────────────────────

/// Processing state of a remote file.
///
/// The service reports a free-form state name. `PROCESSING` and `ACTIVE` map
/// to their variants; every other name, including `FAILED`,
/// `STATE_UNSPECIFIED` and names this crate has never seen, maps to
/// [`FileState::Failed`] carrying the name as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileState {
    Processing,
    Active,
    Failed(String),
}

impl FileState {
    pub fn from_api(name: &str) -> Self {
        match name {
            "PROCESSING" => FileState::Processing,
            "ACTIVE" => FileState::Active,
            other => FileState::Failed(other.to_string()),
        }
    }

    /// State name as the service spells it.
    pub fn as_str(&self) -> &str {
        match self {
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed(name) => name,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, FileState::Processing)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, FileState::Active)
    }

    /// Any state other than `PROCESSING`.
    pub fn is_terminal(&self) -> bool {
        !self.is_processing()
    }
}

impl From<String> for FileState {
    fn from(s: String) -> Self {
        FileState::from_api(&s)
    }
}

impl From<FileState> for String {
    fn from(s: FileState) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── File handle ──────────────────────────────────────────────────────────

/// Remote reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    /// Service-assigned identifier, e.g. `files/abc123`.
    pub name: String,
    /// Human-readable name, usually the uploaded file's name.
    pub display_name: String,
    /// URI used to reference the file in a conversation.
    pub uri: String,
    /// Media type recorded by the service.
    pub mime_type: String,
    /// Last observed processing state.
    pub state: FileState,
}

// ── Conversation ─────────────────────────────────────────────────────────

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of a conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    File { mime_type: String, uri: String },
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn whose only part is a reference to `handle`.
    pub fn user_file(handle: &FileHandle) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::File {
                mime_type: handle.mime_type.clone(),
                uri: handle.uri.clone(),
            }],
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Reply to a conversational exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text, verbatim.
    pub text: String,
    /// Why generation stopped (`STOP`, `MAX_TOKENS`, …), when reported.
    pub finish_reason: Option<String>,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

// ── Capability trait ─────────────────────────────────────────────────────

/// Remote document-intelligence service.
///
/// Implementations perform exactly one network operation per call and never
/// retry; the pipeline is fail-fast.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload the file at `path`, declaring `mime_type` when given.
    async fn upload(
        &self,
        path: &Path,
        mime_type: Option<&str>,
    ) -> Result<FileHandle, TranscribeError>;

    /// Fetch the current handle (and thus state) of the file called `name`.
    async fn get_file(&self, name: &str) -> Result<FileHandle, TranscribeError>;

    /// Open a conversation seeded with `history` and send `instruction`.
    async fn converse(
        &self,
        history: &[Content],
        instruction: &str,
        settings: &GenerationSettings,
    ) -> Result<Completion, TranscribeError>;
}
