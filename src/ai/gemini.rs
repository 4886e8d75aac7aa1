//! Upstream generative-AI client (Gemini `generateContent` REST API).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AiError, GenerateRequest, Generator, InlineData};
use crate::config::AiConfig;

/// Calls `{api_base}/v1beta/models/{model}:generateContent` with the server-held key.
pub struct GeminiModel {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: &'a InlineData,
    },
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiModel {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl Generator for GeminiModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let mut parts = vec![Part::Text {
            text: &request.prompt,
        }];
        if let Some(inline_data) = request.attachment() {
            parts.push(Part::Inline { inline_data });
        }
        let body = ContentRequest {
            contents: vec![Content { role: "user", parts }],
        };

        tracing::debug!(
            model = %self.model,
            multimodal = request.attachment().is_some(),
            "calling upstream model"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(AiError::Empty);
        }
        Ok(text.to_string())
    }
}
