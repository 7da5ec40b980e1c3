pub mod message;
pub mod prompt;
pub mod service;
pub mod store;

pub use message::{Conversation, Message};
pub use service::{ChatService, ContinueOutcome, NewConversation};
pub use store::{ConversationStore, MemoryStore};
