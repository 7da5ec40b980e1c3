use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::providers::llm::ProviderClient;
use crate::providers::ProviderName;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: ProviderName = ProviderName::Gemini;

/// Adapter for the Gemini generateContent endpoint. Unlike the others,
/// the credential travels as a query parameter.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{API_BASE_URL}/{model}:generateContent",
            model = self.model
        )
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn send(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
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

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("Failed to parse response: {e}")))?;

        body.into_text()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "Response contained no candidates"))
    }
}
