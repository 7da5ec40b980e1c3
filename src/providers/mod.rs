pub mod anthropic;
pub mod gemini;
pub mod llm;
pub mod openai;
pub mod select;

pub use llm::ProviderClient;
pub use select::{Credentials, ProviderSelector};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The external LLM services this broker can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    OpenAi,
    Anthropic,
    Gemini,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        };
        write!(f, "{name}")
    }
}
