//! Configuration types for PDF transcription.
//!
//! Two structs, two concerns:
//!
//! * [`GeminiConfig`] — how to reach the service (API key, endpoint, timeout).
//!   Consumed once by [`crate::gemini::GeminiClient::new`]. The key is an
//!   explicit value here, never process-global state, so tests can build a
//!   client against a local mock server with a dummy key.
//!
//! * [`TranscriptionConfig`] — what to do with the file once uploaded: which
//!   model and sampling settings, which instruction, how to poll. Built via
//!   [`TranscriptionConfigBuilder`].

use crate::clock::{Clock, TokioClock};
use crate::error::TranscribeError;
use crate::progress::ProgressCallback;
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default REST endpoint of the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Media type declared for every upload.
pub const PDF_MIME_TYPE: &str = "application/pdf";

// ── Service connection ───────────────────────────────────────────────────

/// Connection settings for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,

    /// Scheme + host (+ optional port) of the API. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-HTTP-request timeout in seconds. Default: 120.
    ///
    /// Applies to each upload, state query and generation call separately.
    /// The readiness wait is not bounded by it.
    pub api_timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: 120,
        }
    }

    /// Read `GEMINI_API_KEY` (required) and `GEMINI_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, TranscribeError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TranscribeError::ProviderNotConfigured {
                hint: "Set GEMINI_API_KEY to a Google AI Studio API key.".to_string(),
            })?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        Ok(config)
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.api_timeout_secs = secs;
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

// ── Generation settings ──────────────────────────────────────────────────

/// Model and sampling settings sent with the transcription exchange.
///
/// Fixed for the duration of a run; the defaults are the values the tool has
/// always shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Model identifier, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// Sampling temperature. Default: 1.0.
    pub temperature: f32,
    /// Nucleus sampling cutoff. Default: 0.95.
    pub top_p: f32,
    /// Top-k sampling cutoff. Default: 64.
    pub top_k: u32,
    /// Maximum tokens the model may generate. Default: 8192.
    pub max_output_tokens: u32,
    /// Requested response media type. Default: `text/plain`.
    pub response_mime_type: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            response_mime_type: prompts::OUTPUT_MIME_TYPE.to_string(),
        }
    }
}

// ── Poll policy ──────────────────────────────────────────────────────────

/// How the readiness poller waits for a file to leave `PROCESSING`.
///
/// The default polls every 10 seconds with no attempt cap and no timeout:
/// the service controls processing latency and a file is waited on until it
/// resolves or the process is stopped. Set [`PollPolicy::max_attempts`] or
/// [`PollPolicy::timeout`] to bound the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Fixed delay between two state queries. Default: 10 s.
    pub interval: Duration,
    /// Maximum number of state queries per file, including the first.
    pub max_attempts: Option<u32>,
    /// Maximum total time spent sleeping per file.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_secs(10))
    }
}

impl PollPolicy {
    /// Poll forever at a fixed interval.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
        }
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether another state query is allowed after `attempts` queries and
    /// `waited` time asleep.
    pub fn allows_another(&self, attempts: u32, waited: Duration) -> bool {
        if let Some(max) = self.max_attempts {
            if attempts >= max {
                return false;
            }
        }
        if let Some(timeout) = self.timeout {
            if waited.saturating_add(self.interval) > timeout {
                return false;
            }
        }
        true
    }
}

// ── Language ─────────────────────────────────────────────────────────────

/// Language of the transcription instruction sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// "Retranscris ce document PDF en texte." (default)
    #[default]
    French,
    /// "Transcribe this PDF document to text."
    English,
}

impl Language {
    pub fn instruction(self) -> &'static str {
        match self {
            Language::French => prompts::INSTRUCTION_FR,
            Language::English => prompts::INSTRUCTION_EN,
        }
    }
}

// ── Transcription config ─────────────────────────────────────────────────

/// Configuration for one transcription run.
///
/// # Example
/// ```rust
/// use gemini_pdf2txt::{Language, PollPolicy, TranscriptionConfig};
/// use std::time::Duration;
///
/// let config = TranscriptionConfig::builder()
///     .language(Language::English)
///     .model("gemini-1.5-pro")
///     .poll(PollPolicy::unbounded(Duration::from_secs(5)).with_max_attempts(60))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct TranscriptionConfig {
    /// Model and sampling settings.
    pub generation: GenerationSettings,

    /// Language of the built-in instruction. Default: French.
    pub language: Language,

    /// Custom instruction. Takes precedence over `language` when set.
    pub instruction: Option<String>,

    /// Media type declared on upload. Default: `application/pdf`.
    pub mime_type: String,

    /// Readiness poll policy.
    pub poll: PollPolicy,

    /// Clock used to sleep between polls. Default: [`TokioClock`].
    pub clock: Arc<dyn Clock>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            language: Language::default(),
            instruction: None,
            mime_type: PDF_MIME_TYPE.to_string(),
            poll: PollPolicy::default(),
            clock: Arc::new(TokioClock),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("generation", &self.generation)
            .field("language", &self.language)
            .field("instruction", &self.instruction)
            .field("mime_type", &self.mime_type)
            .field("poll", &self.poll)
            .field("clock", &"<dyn Clock>")
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn TranscriptionProgressCallback>"),
            )
            .finish()
    }
}

impl TranscriptionConfig {
    /// Create a new builder for `TranscriptionConfig`.
    pub fn builder() -> TranscriptionConfigBuilder {
        TranscriptionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The instruction actually sent: the override if present, else the
    /// built-in one for `language`.
    pub fn instruction(&self) -> &str {
        self.instruction
            .as_deref()
            .unwrap_or_else(|| self.language.instruction())
    }
}

/// Builder for [`TranscriptionConfig`].
pub struct TranscriptionConfigBuilder {
    config: TranscriptionConfig,
}

impl TranscriptionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.generation.temperature = t;
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.generation.top_p = p;
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.generation.top_k = k;
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.generation.max_output_tokens = n;
        self
    }

    pub fn generation(mut self, settings: GenerationSettings) -> Self {
        self.config.generation = settings;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = Some(instruction.into());
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.config.mime_type = mime.into();
        self
    }

    pub fn poll(mut self, policy: PollPolicy) -> Self {
        self.config.poll = policy;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.config.clock = clock;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranscriptionConfig, TranscribeError> {
        let c = &self.config;
        let g = &c.generation;
        if g.model.trim().is_empty() {
            return Err(TranscribeError::InvalidConfig("Model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&g.temperature) {
            return Err(TranscribeError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                g.temperature
            )));
        }
        if !(g.top_p > 0.0 && g.top_p <= 1.0) {
            return Err(TranscribeError::InvalidConfig(format!(
                "top_p must be in (0, 1], got {}",
                g.top_p
            )));
        }
        if g.max_output_tokens == 0 {
            return Err(TranscribeError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.poll.interval.is_zero() {
            return Err(TranscribeError::InvalidConfig(
                "Poll interval must be greater than zero".into(),
            ));
        }
        if c.poll.max_attempts == Some(0) {
            return Err(TranscribeError::InvalidConfig(
                "max_attempts must be ≥ 1 when set".into(),
            ));
        }
        if matches!(c.instruction.as_deref(), Some(i) if i.trim().is_empty()) {
            return Err(TranscribeError::InvalidConfig(
                "Instruction must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
