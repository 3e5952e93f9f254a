//! [`DocumentService`] over the Gemini REST API.
//!
//! Three endpoints are used:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | upload    | `POST /upload/v1beta/files` (resumable: start, then upload + finalize) |
//! | state     | `GET /v1beta/{name}` |
//! | exchange  | `POST /v1beta/models/{model}:generateContent` |
//!
//! Every call is a single attempt. Status codes are mapped onto
//! [`TranscribeError`] so callers can tell an auth problem from a quota
//! problem from an outage without parsing strings.

mod wire;

use crate::config::{GeminiConfig, GenerationSettings, PDF_MIME_TYPE};
use crate::error::TranscribeError;
use crate::service::{Completion, Content, DocumentService, FileHandle};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use wire::{
    error_message, GenerateContentRequest, GenerateContentResponse, StartUploadFile,
    StartUploadRequest, UploadResponse, WireContent, WireFile, WireGenerationConfig,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, TranscribeError> {
        if config.api_key.trim().is_empty() {
            return Err(TranscribeError::ProviderNotConfigured {
                hint: "The Gemini API key is empty. Set GEMINI_API_KEY.".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| TranscribeError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn generate_path(model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("v1beta/models/{model}:generateContent")
    }
}

#[async_trait]
impl DocumentService for GeminiClient {
    async fn upload(
        &self,
        path: &Path,
        mime_type: Option<&str>,
    ) -> Result<FileHandle, TranscribeError> {
        let bytes = read_upload_file(path).await?;
        let mime = mime_type.map(str::to_string).unwrap_or_else(|| guess_mime(path));
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());

        debug!(
            "Starting resumable upload of {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime
        );

        // ── Start the upload session ─────────────────────────────────────
        let start = self
            .http
            .post(self.url("upload/v1beta/files"))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", &mime)
            .json(&StartUploadRequest {
                file: StartUploadFile {
                    display_name: &display_name,
                },
            })
            .send()
            .await
            .map_err(|e| transport("upload", e))?;
        let start = check_status(start, "upload").await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| TranscribeError::InvalidResponse {
                operation: "upload".into(),
                detail: format!("missing {UPLOAD_URL_HEADER} header"),
            })?;

        // ── Send the bytes and finalise ──────────────────────────────────
        let finish = self
            .http
            .post(&upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| transport("upload", e))?;
        let finish = check_status(finish, "upload").await?;

        let uploaded: UploadResponse = finish.json().await.map_err(|e| {
            TranscribeError::InvalidResponse {
                operation: "upload".into(),
                detail: e.to_string(),
            }
        })?;

        Ok(uploaded.file.into_handle())
    }

    async fn get_file(&self, name: &str) -> Result<FileHandle, TranscribeError> {
        let response = self
            .http
            .get(self.url(&format!("v1beta/{name}")))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| transport("state query", e))?;
        let response = check_status(response, "state query").await?;

        let file: WireFile =
            response
                .json()
                .await
                .map_err(|e| TranscribeError::InvalidResponse {
                    operation: "state query".into(),
                    detail: e.to_string(),
                })?;

        Ok(file.into_handle())
    }

    async fn converse(
        &self,
        history: &[Content],
        instruction: &str,
        settings: &GenerationSettings,
    ) -> Result<Completion, TranscribeError> {
        self.generate_content(history, instruction, settings)
            .await
            .map_err(TranscribeError::into_request_phase)
    }
}

impl GeminiClient {
    async fn generate_content(
        &self,
        history: &[Content],
        instruction: &str,
        settings: &GenerationSettings,
    ) -> Result<Completion, TranscribeError> {
        let mut contents: Vec<WireContent> = history.iter().map(WireContent::from).collect();
        contents.push(WireContent::from(&Content::user_text(instruction)));

        let body = GenerateContentRequest {
            contents,
            generation_config: WireGenerationConfig::from(settings),
        };

        let response = self
            .http
            .post(self.url(&Self::generate_path(&settings.model)))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport("transcription request", e))?;
        let response = check_status(response, "transcription request").await?;

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| TranscribeError::InvalidResponse {
                    operation: "transcription request".into(),
                    detail: e.to_string(),
                })?;

        if let Some(reason) = parsed.block_reason() {
            return Err(TranscribeError::Blocked { reason });
        }

        let text = parsed.text();
        if text.is_empty() {
            return Err(TranscribeError::EmptyResponse {
                finish_reason: parsed.finish_reason(),
            });
        }

        let (input_tokens, output_tokens) = parsed
            .usage_metadata
            .as_ref()
            .map(|u| {
                (
                    u.prompt_token_count.unwrap_or(0),
                    u.candidates_token_count.unwrap_or(0),
                )
            })
            .unwrap_or((0, 0));

        Ok(Completion {
            finish_reason: parsed.finish_reason(),
            text,
            input_tokens,
            output_tokens,
        })
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn read_upload_file(path: &Path) -> Result<Vec<u8>, TranscribeError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TranscribeError::FileNotFound {
            path: PathBuf::from(path),
        },
        std::io::ErrorKind::PermissionDenied => TranscribeError::PermissionDenied {
            path: PathBuf::from(path),
        },
        _ => TranscribeError::Internal(format!("Failed to read {}: {e}", path.display())),
    })
}

fn guess_mime(path: &Path) -> String {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_MIME_TYPE.to_string(),
        Some("txt") => "text/plain".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

fn transport(operation: &str, e: reqwest::Error) -> TranscribeError {
    let detail = if e.is_timeout() {
        format!("timed out: {e}")
    } else {
        e.to_string()
    };
    TranscribeError::Transport {
        operation: operation.to_string(),
        detail,
    }
}

/// Pass 2xx responses through; turn everything else into a typed error.
async fn check_status(response: Response, operation: &str) -> Result<Response, TranscribeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    debug!("{operation} failed: HTTP {status}: {message}");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TranscribeError::AuthError { detail: message }
        }
        StatusCode::TOO_MANY_REQUESTS => TranscribeError::RateLimitExceeded { retry_after_secs },
        _ => TranscribeError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        },
    })
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
