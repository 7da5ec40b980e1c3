use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use super::types::{MessagesRequest, MessagesResponse};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::providers::llm::ProviderClient;
use crate::providers::ProviderName;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const PROVIDER: ProviderName = ProviderName::Anthropic;

/// Adapter for the Anthropic messages endpoint. The credential travels as
/// an `x-api-key` header alongside a pinned API version.
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(http: Client, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
        }
    }

    fn build_headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            ProviderError::new(
                PROVIDER,
                ProviderErrorKind::InvalidCredential,
                "Credential is not a valid header value",
            )
        })?;
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    async fn send(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = MessagesRequest::user(&self.model, self.max_tokens, prompt);
        let headers = self.build_headers()?;

        let response = self
            .http
            .post(API_URL)
            .headers(headers)
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

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("Failed to parse response: {e}")))?;

        body.into_text()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "Response contained no content blocks"))
    }
}
