//! Generative-AI plumbing.
//!
//! - [`Generator`] is the one seam: "turn a prompt (plus optional inline media) into text".
//! - [`gemini::GeminiModel`] implements it against the upstream API (server side).
//! - [`proxy`] exposes any generator as `POST /api/generate`.
//! - [`client::ProxyClient`] implements it by calling that endpoint (client side).
//! - [`helpers`] and [`prompts`] build the journal's AI features on top, always
//!   degrading to a fallback instead of failing.

pub mod client;
pub mod gemini;
pub mod helpers;
pub mod prompts;
pub mod proxy;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inline media sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Base64-encoded payload.
    pub data: String,
    pub mime_type: String,
}

impl InlineData {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineData>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            audio: None,
            image: None,
        }
    }

    pub fn with_audio(mut self, audio: InlineData) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_image(mut self, image: InlineData) -> Self {
        self.image = Some(image);
        self
    }

    /// The single attachment forwarded upstream. Audio wins if both are present.
    pub fn attachment(&self) -> Option<&InlineData> {
        self.audio.as_ref().or(self.image.as_ref())
    }
}

/// Success body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no text")]
    Empty,

    #[error("request cancelled")]
    Cancelled,
}

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run exactly one generation. Implementations return trimmed text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError>;
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` fence and a trailing ```` ``` ````.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string (e.g. `json`) up to the end of the first line.
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}
