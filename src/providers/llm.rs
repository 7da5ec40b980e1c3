use crate::error::ProviderError;
use async_trait::async_trait;

/// One external LLM service. Each adapter owns its request envelope,
/// credential transport, and response-path extraction.
///
/// One attempt per call; retries and fallback are deliberately absent.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Sends a plain-text prompt and returns the provider's reply text.
    async fn send(&self, prompt: &str) -> Result<String, ProviderError>;
}
