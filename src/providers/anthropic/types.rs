use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: Role,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

impl<'a> MessagesRequest<'a> {
    /// Single user-turn request; the whole conversation arrives as one
    /// concatenated prompt.
    pub fn user(model: &'a str, max_tokens: u32, prompt: &'a str) -> Self {
        Self {
            model,
            max_tokens,
            messages: vec![Message {
                role: Role::User,
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    pub text: String,
}

impl MessagesResponse {
    /// The reply lives at `content[0].text`.
    pub fn into_text(self) -> Option<String> {
        self.content.into_iter().next().map(|block| block.text)
    }
}
