pub mod broker;
pub mod chat;
pub mod config;
pub mod error;
pub mod providers;

pub use broker::{AiBroker, ResponseBroker};
pub use chat::{ChatService, Conversation, MemoryStore, Message, NewConversation};
pub use config::Config;
pub use error::{AiError, ChatError, ProviderError, ProviderErrorKind, StoreError};
pub use providers::Credentials;
