use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::config::Config;
use crate::error::AiError;
use crate::providers::anthropic::AnthropicClient;
use crate::providers::gemini::GeminiClient;
use crate::providers::llm::ProviderClient;
use crate::providers::openai::OpenAiClient;
use crate::providers::{Credentials, ProviderName, ProviderSelector};

/// The single seam the conversation service depends on for AI replies.
/// Stubbed in tests; implemented by [`ResponseBroker`] in production.
#[async_trait]
pub trait AiBroker: Send + Sync {
    async fn get_response(&self, prompt: &str, credentials: &Credentials)
        -> Result<String, AiError>;
}

/// Resolves exactly one provider per request and normalizes its outcome.
///
/// Whatever provider ends up handling the call, the caller sees either
/// reply text or one [`AiError`]. No fallback to a second provider on
/// failure; one attempt is the contract.
pub struct ResponseBroker {
    selector: ProviderSelector,
    http: Client,
    config: Config,
}

impl ResponseBroker {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        // Unbounded provider calls would pin a request forever; every
        // outbound call shares this client and its timeout.
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let selector = ProviderSelector::new(config.default_gemini_key.clone());
        Ok(Self {
            selector,
            http,
            config,
        })
    }

    fn client_for(&self, provider: ProviderName, api_key: String) -> Box<dyn ProviderClient> {
        match provider {
            ProviderName::OpenAi => Box::new(OpenAiClient::new(
                self.http.clone(),
                api_key,
                self.config.openai.model.clone(),
                self.config.openai.max_tokens,
            )),
            ProviderName::Anthropic => Box::new(AnthropicClient::new(
                self.http.clone(),
                api_key,
                self.config.anthropic.model.clone(),
                self.config.anthropic.max_tokens,
            )),
            ProviderName::Gemini => Box::new(GeminiClient::new(
                self.http.clone(),
                api_key,
                self.config.gemini.model.clone(),
            )),
        }
    }
}

#[async_trait]
impl AiBroker for ResponseBroker {
    async fn get_response(
        &self,
        prompt: &str,
        credentials: &Credentials,
    ) -> Result<String, AiError> {
        let (provider, api_key) = self.selector.select(credentials)?;
        debug!("[Broker] provider: {provider}");

        let client = self.client_for(provider, api_key);
        client.send(prompt).await.map_err(AiError::Response)
    }
}
