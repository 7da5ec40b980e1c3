use serde::{Deserialize, Serialize};

/// Request envelope for the completions endpoint.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub text: String,
}

impl CompletionResponse {
    /// The reply lives at `choices[0].text`; leading and trailing
    /// whitespace is the provider's padding, not content.
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
    }
}
