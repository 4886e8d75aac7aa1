//! Client side of the proxy: a [`Generator`] that POSTs to `/api/generate`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{AiError, GenerateRequest, GenerateResponse, Generator};
use crate::config::AiConfig;

pub struct ProxyClient {
    client: Client,
    url: String,
}

impl ProxyClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        Self::with_url(&config.proxy_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_url(url: &str, timeout: Duration) -> Result<Self, AiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Generator for ProxyClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let GenerateResponse { text } = response.json().await?;
        if text.trim().is_empty() {
            return Err(AiError::Empty);
        }
        Ok(text.trim().to_string())
    }
}
