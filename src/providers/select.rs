use serde::Deserialize;

use crate::error::AiError;
use crate::providers::ProviderName;

/// Caller-supplied provider credentials for a single request. Never
/// persisted; dropped as soon as the request resolves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.openai.is_none() && self.anthropic.is_none() && self.gemini.is_none()
    }
}

/// Picks exactly one provider for a request.
///
/// Priority is fixed: the caller's OpenAI key, then Anthropic, then
/// Gemini, then the operator-configured default Gemini key. The order is
/// a policy choice, not a technical constraint; a real deployment would
/// make it configurable.
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    default_gemini: Option<String>,
}

impl ProviderSelector {
    /// The default credential is injected here once, at startup, rather
    /// than read from the environment on every call.
    pub fn new(default_gemini: Option<String>) -> Self {
        Self { default_gemini }
    }

    pub fn select(&self, credentials: &Credentials) -> Result<(ProviderName, String), AiError> {
        if let Some(key) = &credentials.openai {
            return Ok((ProviderName::OpenAi, key.clone()));
        }
        if let Some(key) = &credentials.anthropic {
            return Ok((ProviderName::Anthropic, key.clone()));
        }
        if let Some(key) = &credentials.gemini {
            return Ok((ProviderName::Gemini, key.clone()));
        }
        match &self.default_gemini {
            Some(key) => Ok((ProviderName::Gemini, key.clone())),
            None => Err(AiError::NoProviderAvailable),
        }
    }
}
