//! # gemini-pdf2txt
//!
//! Transcribe PDF documents to plain text with Google's Gemini models.
//!
//! The document understanding happens entirely on the service side: the PDF
//! is uploaded through the Gemini Files API, the service processes it
//! asynchronously, and once the file is `ACTIVE` a single conversational
//! exchange asks the model to transcribe it. This crate owns the sequencing
//! and the failure semantics of those three steps.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate a local path, or persist in-memory bytes to a temp file
//!  ├─ 2. Ingest   upload to the Files API → FileHandle (single attempt)
//!  ├─ 3. Poll     re-query the handle until it leaves PROCESSING
//!  ├─ 4. Request  one exchange: [file] + instruction → text
//!  └─ 5. Output   text + per-phase stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_pdf2txt::{transcribe, GeminiClient, GeminiConfig, TranscriptionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(GeminiConfig::from_env()?)?;
//!     let config = TranscriptionConfig::default();
//!     let output = transcribe("document.pdf", &client, &config).await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without the network
//!
//! Every step talks to the service through the [`DocumentService`] trait and
//! sleeps through the [`Clock`] trait, so the whole pipeline runs against a
//! scripted fake with no real waiting. See `tests/pipeline.rs`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clock;
pub mod config;
pub mod error;
pub mod gemini;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod service;
pub mod transcribe;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clock::{Clock, TokioClock};
pub use config::{
    GeminiConfig, GenerationSettings, Language, PollPolicy, TranscriptionConfig,
    TranscriptionConfigBuilder,
};
pub use error::TranscribeError;
pub use gemini::GeminiClient;
pub use output::{TranscriptionOutput, TranscriptionStats};
pub use pipeline::input::UploadedBlob;
pub use progress::{NoopProgressCallback, ProgressCallback, TranscriptionProgressCallback};
pub use service::{Completion, Content, DocumentService, FileHandle, FileState, Part, Role};
pub use transcribe::{transcribe, transcribe_blob, transcribe_sync, transcribe_to_file};
