//! JSON bodies exchanged with the Gemini REST API.
//!
//! Only the fields this crate reads or writes are modelled; unknown fields in
//! responses are ignored.

use crate::config::GenerationSettings;
use crate::service::{Content, FileHandle, FileState, Part, Role};
use serde::{Deserialize, Serialize};

// ── Files API ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct StartUploadRequest<'a> {
    pub file: StartUploadFile<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartUploadFile<'a> {
    pub display_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: WireFile,
}

/// `File` resource as returned by `files.get` and the upload finaliser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireFile {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl WireFile {
    /// A missing state is reported as `STATE_UNSPECIFIED`, which maps to failure.
    pub fn into_handle(self) -> FileHandle {
        let state = FileState::from_api(self.state.as_deref().unwrap_or("STATE_UNSPECIFIED"));
        FileHandle {
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            uri: self.uri.unwrap_or_default(),
            mime_type: self.mime_type.unwrap_or_default(),
            name: self.name,
            state,
        }
    }
}

// ── generateContent ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    pub generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireContent {
    pub role: &'static str,
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum WirePart {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: WireFileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireFileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireGenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl From<&GenerationSettings> for WireGenerationConfig {
    fn from(s: &GenerationSettings) -> Self {
        Self {
            temperature: s.temperature,
            top_p: s.top_p,
            top_k: s.top_k,
            max_output_tokens: s.max_output_tokens,
            response_mime_type: s.response_mime_type.clone(),
        }
    }
}

impl From<&Content> for WireContent {
    fn from(c: &Content) -> Self {
        Self {
            role: match c.role {
                Role::User => "user",
                Role::Model => "model",
            },
            parts: c
                .parts
                .iter()
                .map(|p| match p {
                    Part::Text(text) => WirePart::Text { text: text.clone() },
                    Part::File { mime_type, uri } => WirePart::File {
                        file_data: WireFileData {
                            mime_type: mime_type.clone(),
                            file_uri: uri.clone(),
                        },
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub fn finish_reason(&self) -> Option<String> {
        self.candidates.first().and_then(|c| c.finish_reason.clone())
    }

    pub fn block_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
    }
}

// ── Errors ───────────────────────────────────────────────────────────────

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Best-effort human message from an error response body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(status) if !status.is_empty() => format!("{status}: {}", env.error.message),
            _ => env.error.message,
        },
        Err(_) => body.trim().chars().take(500).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_file_into_handle() {
        let f: WireFile = serde_json::from_value(json!({
            "name": "files/abc123",
            "displayName": "report.pdf",
            "mimeType": "application/pdf",
            "sizeBytes": "1024",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
            "state": "PROCESSING"
        }))
        .unwrap();
        let h = f.into_handle();
        assert_eq!(h.name, "files/abc123");
        assert_eq!(h.display_name, "report.pdf");
        assert_eq!(h.state, FileState::Processing);
    }

    #[test]
    fn missing_state_maps_to_failure() {
        let f: WireFile = serde_json::from_value(json!({ "name": "files/x" })).unwrap();
        let h = f.into_handle();
        assert_eq!(h.state, FileState::Failed("STATE_UNSPECIFIED".into()));
        assert_eq!(h.display_name, "files/x");
    }

    #[test]
    fn request_body_shape() {
        let history = vec![Content {
            role: Role::User,
            parts: vec![Part::File {
                mime_type: "application/pdf".into(),
                uri: "https://example/files/x".into(),
            }],
        }];
        let mut contents: Vec<WireContent> = history.iter().map(WireContent::from).collect();
        contents.push(WireContent::from(&Content::user_text("Transcribe.")));
        let req = GenerateContentRequest {
            contents,
            generation_config: WireGenerationConfig::from(&GenerationSettings::default()),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v["contents"][0]["parts"][0]["fileData"]["fileUri"],
            "https://example/files/x"
        );
        assert_eq!(v["contents"][0]["parts"][0]["fileData"]["mimeType"], "application/pdf");
        assert_eq!(v["contents"][1]["role"], "user");
        assert_eq!(v["contents"][1]["parts"][0]["text"], "Transcribe.");
        assert_eq!(v["generationConfig"]["topK"], 64);
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(v["generationConfig"]["responseMimeType"], "text/plain");
    }

    #[test]
    fn response_text_joins_parts() {
        let r: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 258, "candidatesTokenCount": 2 }
        }))
        .unwrap();
        assert_eq!(r.text(), "Hello world");
        assert_eq!(r.finish_reason().as_deref(), Some("STOP"));
        assert_eq!(r.usage_metadata.unwrap().prompt_token_count, Some(258));
    }

    #[test]
    fn blocked_response() {
        let r: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(r.text(), "");
        assert_eq!(r.block_reason().as_deref(), Some("SAFETY"));
    }

    #[test]
    fn error_message_from_envelope_or_raw() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "INVALID_ARGUMENT: API key not valid.");
        assert_eq!(error_message("  upstream connect error  "), "upstream connect error");
    }
}
