//! End-to-end tests against the live Gemini API.
//!
//! These tests upload real PDF files from `./test_cases/` and spend API
//! quota. They are gated behind `E2E_ENABLED` and need `GEMINI_API_KEY`.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use gemini_pdf2txt::{
    transcribe, transcribe_to_file, GeminiClient, GeminiConfig, Language, TranscribeError,
    TranscriptionConfig,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip unless E2E_ENABLED and GEMINI_API_KEY are set and `path` exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if std::env::var("GEMINI_API_KEY").map_or(true, |k| k.is_empty()) {
            println!("SKIP: GEMINI_API_KEY is not set");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn client() -> GeminiClient {
    let config = GeminiConfig::from_env().expect("GEMINI_API_KEY");
    GeminiClient::new(config).expect("client")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_transcribe_french_default() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let output = transcribe(&path, &client(), &TranscriptionConfig::default())
        .await
        .expect("transcription");

    println!("{}", output.text);
    println!("stats: {:?}", output.stats);
    assert!(!output.text.trim().is_empty());
    assert!(output.file.name.starts_with("files/"));
    assert!(output.file.state.is_active());
    assert!(output.stats.poll_attempts >= 1);
}

#[tokio::test]
async fn test_transcribe_english_to_file() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let out = output_dir().join("sample_en.txt");

    let config = TranscriptionConfig::builder()
        .language(Language::English)
        .build()
        .expect("config");

    let output = transcribe_to_file(&path, &out, &client(), &config)
        .await
        .expect("transcription");

    let saved = std::fs::read_to_string(&out).expect("saved file");
    assert_eq!(saved, output.text);
}

#[tokio::test]
async fn test_invalid_key_is_auth_error() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let bad = GeminiClient::new(GeminiConfig::new("not-a-real-key")).expect("client");
    let err = transcribe(&path, &bad, &TranscriptionConfig::default())
        .await
        .unwrap_err();

    assert!(
        matches!(err, TranscribeError::AuthError { .. } | TranscribeError::Api { .. }),
        "unexpected error: {err:?}"
    );
}
