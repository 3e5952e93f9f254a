//! CLI binary for gemini-pdf2txt.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranscriptionConfig`, prints the text, and optionally saves it.

use anyhow::{Context, Result};
use clap::Parser;
use gemini_pdf2txt::prompts::DEFAULT_OUTPUT_FILE_NAME;
use gemini_pdf2txt::{
    transcribe, transcribe_to_file, FileHandle, FileState, GeminiClient, GeminiConfig, Language,
    PollPolicy, ProgressCallback, TranscribeError, TranscriptionConfig,
    TranscriptionProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that follows the run: uploading → waiting (one dot per poll) →
/// transcribing.
struct CliProgressCallback {
    bar: ProgressBar,
    messages: UiMessages,
}

impl CliProgressCallback {
    fn new(messages: UiMessages) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, messages })
    }
}

impl TranscriptionProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, path: &Path) {
        self.bar.set_prefix(self.messages.uploading);
        self.bar.set_message(path.display().to_string());
    }

    fn on_uploaded(&self, handle: &FileHandle) {
        self.bar.println(format!(
            "{} Uploaded file '{}' as: {}",
            cyan("◆"),
            bold(&handle.display_name),
            dim(&handle.uri)
        ));
        self.bar.set_prefix(self.messages.waiting);
        self.bar.set_message(String::new());
    }

    fn on_poll(&self, attempt: u32, state: &FileState) {
        if state.is_processing() {
            self.bar.set_message(".".repeat((attempt as usize).min(40)));
        }
    }

    fn on_ready(&self, _handle: &FileHandle) {
        self.bar.println(format!("  {} {}", green("✓"), self.messages.ready));
    }

    fn on_request_start(&self) {
        self.bar.set_prefix(self.messages.transcribing);
        self.bar.set_message(String::new());
    }

    fn on_error(&self, _error: &TranscribeError) {
        self.bar.finish_and_clear();
    }

    fn on_complete(&self, text_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}",
            green("✔"),
            dim(&format!("{text_len} chars"))
        );
    }
}

/// Status lines in the two UI languages the tool ships with.
#[derive(Clone, Copy)]
struct UiMessages {
    uploading: &'static str,
    waiting: &'static str,
    ready: &'static str,
    transcribing: &'static str,
}

impl UiMessages {
    fn for_language(language: Language) -> Self {
        match language {
            Language::French => Self {
                uploading: "Chargement",
                waiting: "Traitement en cours",
                ready: "Fichier prêt",
                transcribing: "Retranscription en cours",
            },
            Language::English => Self {
                uploading: "Uploading",
                waiting: "Processing",
                ready: "File ready",
                transcribing: "Transcribing",
            },
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe to stdout (French instruction)
  pdf2txt scan.pdf

  # English instruction, save as transcription.txt
  pdf2txt --lang en scan.pdf --save

  # Save to a specific file
  pdf2txt scan.pdf -o notes/scan.txt

  # Give up if the file is not ready after 5 minutes
  pdf2txt --poll-timeout 300 scan.pdf

  # JSON output with stats
  pdf2txt --json scan.pdf > scan.json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google AI Studio API key (required)
  GEMINI_BASE_URL         Override the API endpoint
  RUST_LOG                Override the log filter (e.g. gemini_pdf2txt=debug)
"#;

/// Transcribe PDF files to plain text with Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Transcribe PDF files to plain text with Gemini",
    long_about = "Upload a PDF to the Gemini Files API, wait until it has been processed, \
and ask the model to transcribe it into plain text.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the transcription to this file instead of stdout.
    #[arg(short, long, env = "PDF2TXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Write the transcription to ./transcription.txt.
    #[arg(long, conflicts_with = "output")]
    save: bool,

    /// Gemini model ID.
    #[arg(long, env = "PDF2TXT_MODEL", default_value = gemini_pdf2txt::config::DEFAULT_MODEL)]
    model: String,

    /// Instruction and UI language: fr or en.
    #[arg(long, env = "PDF2TXT_LANG", value_enum, default_value = "fr")]
    lang: LangArg,

    /// Custom instruction sent instead of the built-in one.
    #[arg(long, env = "PDF2TXT_INSTRUCTION")]
    instruction: Option<String>,

    /// Seconds between two state queries while the file is processing.
    #[arg(long, env = "PDF2TXT_POLL_INTERVAL", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,

    /// Give up after this many state queries (default: never).
    #[arg(long, env = "PDF2TXT_MAX_POLL_ATTEMPTS",
          value_parser = clap::value_parser!(u32).range(1..))]
    max_poll_attempts: Option<u32>,

    /// Give up after waiting this many seconds (default: never).
    #[arg(long, env = "PDF2TXT_POLL_TIMEOUT")]
    poll_timeout: Option<u64>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "PDF2TXT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Output structured JSON (TranscriptionOutput) instead of text.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LangArg {
    Fr,
    En,
}

impl From<LangArg> for Language {
    fn from(v: LangArg) -> Self {
        match v {
            LangArg::Fr => Language::French,
            LangArg::En => Language::English,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports every phase; keep library INFO logs out of
    // its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Service client ───────────────────────────────────────────────────
    let gemini = GeminiConfig::from_env()
        .context("Missing API credentials")?
        .api_timeout_secs(cli.api_timeout);
    let client = GeminiClient::new(gemini).context("Failed to create Gemini client")?;

    // ── Build config ─────────────────────────────────────────────────────
    let language: Language = cli.lang.into();
    let spinner =
        show_progress.then(|| CliProgressCallback::new(UiMessages::for_language(language)));
    let progress_cb = spinner.clone().map(|s| s as ProgressCallback);
    let config = match build_config(&cli, progress_cb) {
        Ok(config) => config,
        Err(e) => {
            if let Some(s) = &spinner {
                s.bar.finish_and_clear();
            }
            return Err(e);
        }
    };

    // ── Run ──────────────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .or_else(|| cli.save.then(|| PathBuf::from(DEFAULT_OUTPUT_FILE_NAME)));

    let output = match output_path {
        Some(ref path) => transcribe_to_file(&cli.input, path, &client, &config)
            .await
            .context("Transcription failed")?,
        None => transcribe(&cli.input, &client, &config)
            .await
            .context("Transcription failed")?,
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if output_path.is_none() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        if let Some(ref path) = output_path {
            eprintln!(
                "{}  →  {}",
                green("✔"),
                bold(&path.display().to_string())
            );
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out  —  {} state queries  —  {}ms total",
            dim(&output.stats.input_tokens.to_string()),
            dim(&output.stats.output_tokens.to_string()),
            output.stats.poll_attempts,
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `TranscriptionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TranscriptionConfig> {
    let mut poll = PollPolicy::unbounded(Duration::from_secs(cli.poll_interval));
    if let Some(n) = cli.max_poll_attempts {
        poll = poll.with_max_attempts(n);
    }
    if let Some(secs) = cli.poll_timeout {
        poll = poll.with_timeout(Duration::from_secs(secs));
    }

    let mut builder = TranscriptionConfig::builder()
        .model(cli.model.clone())
        .language(cli.lang.into())
        .poll(poll);

    if let Some(ref instruction) = cli.instruction {
        builder = builder.instruction(instruction.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
