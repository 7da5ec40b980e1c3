use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub model: String,
    pub max_tokens: u32,
}

/// Process-wide configuration, read once at startup and immutable after.
///
/// The operator default Gemini key is the only credential that lives here;
/// caller-supplied keys arrive per request and are never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Fallback Gemini credential used when a caller supplies no key.
    /// Absent means callers without keys get `NoProviderAvailable`.
    #[serde(default)]
    pub default_gemini_key: Option<String>,
    /// Bound on every outbound provider call.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,
    #[serde(default = "default_anthropic")]
    pub anthropic: ProviderConfig,
    #[serde(default = "default_gemini")]
    pub gemini: ProviderConfig,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_openai() -> ProviderConfig {
    ProviderConfig {
        model: "text-davinci-003".to_string(),
        max_tokens: 150,
    }
}

fn default_anthropic() -> ProviderConfig {
    ProviderConfig {
        model: "claude-3-sonnet-20240229".to_string(),
        max_tokens: 1024,
    }
}

fn default_gemini() -> ProviderConfig {
    ProviderConfig {
        model: "gemini-1.5-flash-latest".to_string(),
        // Gemini's generateContent does not take a max_tokens field in
        // this envelope; kept for config-shape uniformity.
        max_tokens: 1024,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_gemini_key: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            openai: default_openai(),
            anthropic: default_anthropic(),
            gemini: default_gemini(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file is absent. The default Gemini key may also
    /// come from the `GEMINI_API_KEY` environment variable; an explicit
    /// file value wins.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, env_default_key())
    }

    /// `env_key` stands in for the `GEMINI_API_KEY` environment read,
    /// so loading stays deterministic under test.
    pub fn load_with_env(path: &Path, env_key: Option<String>) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };

        if config.default_gemini_key.is_none() {
            config.default_gemini_key = env_key;
        }

        Ok(config)
    }
}

fn env_default_key() -> Option<String> {
    dotenv::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GEMINI_API_KEY"))
        .ok()
}
