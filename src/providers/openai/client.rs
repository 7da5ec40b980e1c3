use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::{CompletionRequest, CompletionResponse};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::providers::llm::ProviderClient;
use crate::providers::ProviderName;

const API_URL: &str = "https://api.openai.com/v1/completions";
const PROVIDER: ProviderName = ProviderName::OpenAi;

/// Adapter for the OpenAI completions endpoint. The credential travels as
/// a bearer authorization header.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(http: Client, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    async fn send(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(API_URL)
            .header("Authorization", format!("Bearer {key}", key = self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, &e))?;

        match response.status() {
            StatusCode::OK => {}
            status => {
                let kind = ProviderErrorKind::from_status(status);
                let detail = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ProviderError::new(
                    PROVIDER,
                    kind,
                    format!("status {status}: {detail}"),
                ));
            }
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("Failed to parse response: {e}")))?;

        body.into_text()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "Response contained no choices"))
    }
}
