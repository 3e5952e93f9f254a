//! Instructions sent to the model with the uploaded PDF.
//!
//! The tool has always shipped in two UI languages; the instruction follows
//! the UI language. Callers can override it via
//! [`crate::config::TranscriptionConfig::instruction`].

/// French instruction (default).
pub const INSTRUCTION_FR: &str = "Retranscris ce document PDF en texte.";

/// English instruction.
pub const INSTRUCTION_EN: &str = "Transcribe this PDF document to text.";

/// Artifact name offered for download when no output path is given.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "transcription.txt";

/// Media type of the transcription: requested from the model and used for
/// the saved artifact.
pub const OUTPUT_MIME_TYPE: &str = "text/plain";
