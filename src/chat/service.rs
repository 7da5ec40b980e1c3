use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::broker::AiBroker;
use crate::chat::message::{Conversation, Message};
use crate::chat::prompt;
use crate::chat::store::ConversationStore;
use crate::error::ChatError;
use crate::providers::Credentials;

/// Payload for starting a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConversation {
    pub partner_name: String,
    pub concern: String,
    pub message: String,
    pub caller_name: Option<String>,
    pub caller_age: Option<u32>,
}

/// Result of a follow-up turn.
#[derive(Debug)]
pub struct ContinueOutcome {
    pub reply: String,
    pub conversation: Conversation,
}

/// Orchestrates conversations over a store and the AI broker.
///
/// Mutating operations on one conversation ID are serialized through a
/// per-ID mutex, so two concurrent follow-ups cannot interleave their
/// read-append-persist sequences.
pub struct ChatService<S> {
    store: S,
    broker: Box<dyn AiBroker>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: ConversationStore> ChatService<S> {
    pub fn new(store: S, broker: Box<dyn AiBroker>) -> Self {
        Self {
            store,
            broker,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a conversation: first-turn prompt, one broker call, then a
    /// persisted log of exactly two messages (caller, then reply).
    pub async fn submit(
        &self,
        owner_id: &str,
        request: NewConversation,
        credentials: &Credentials,
    ) -> Result<Conversation, ChatError> {
        validate(&request)?;
        debug!("[Chat] submit for owner: {owner_id}");

        let first_prompt = prompt::first_turn(
            request.caller_name.as_deref(),
            &request.partner_name,
            request.caller_age,
            &request.concern,
        );
        let reply = self.broker.get_response(&first_prompt, credentials).await?;

        let mut conversation = Conversation::new(owner_id, request.partner_name, request.concern);
        conversation.push(Message::caller(request.message));
        conversation.push(Message::reply(reply));
        self.store.insert(&conversation).await?;

        Ok(conversation)
    }

    /// Saves a conversation with the opening caller message only; the
    /// broker is never consulted.
    pub async fn save(
        &self,
        owner_id: &str,
        request: NewConversation,
    ) -> Result<Conversation, ChatError> {
        validate(&request)?;
        debug!("[Chat] save for owner: {owner_id}");

        let mut conversation = Conversation::new(owner_id, request.partner_name, request.concern);
        conversation.push(Message::caller(request.message));
        self.store.insert(&conversation).await?;

        Ok(conversation)
    }

    /// Appends a follow-up turn. Ownership is checked before any
    /// mutation; the caller message is persisted before the broker call
    /// and survives a failed reply.
    pub async fn continue_conversation(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
        follow_up: &str,
        credentials: &Credentials,
    ) -> Result<ContinueOutcome, ChatError> {
        let lock = self.lock_for(conversation_id).await;
        let _serialized = lock.lock().await;

        let mut conversation = self
            .store
            .get(conversation_id)
            .await?
            .ok_or(ChatError::NotFound)?;
        if conversation.owner_id() != owner_id {
            return Err(ChatError::Forbidden);
        }

        conversation.push(Message::caller(follow_up));
        self.store.update(&conversation).await?;

        debug!(
            "[Chat] continue {conversation_id}: {count} messages in history",
            count = conversation.messages().len()
        );
        let reply = self
            .broker
            .get_response(&conversation.transcript(), credentials)
            .await?;

        conversation.push(Message::reply(&reply));
        self.store.update(&conversation).await?;

        Ok(ContinueOutcome {
            reply,
            conversation,
        })
    }

    /// Fetches one owned conversation. A conversation owned by someone
    /// else is indistinguishable from an absent one.
    pub async fn get_conversation(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
    ) -> Result<Conversation, ChatError> {
        match self.store.get(conversation_id).await? {
            Some(conversation) if conversation.owner_id() == owner_id => Ok(conversation),
            _ => Err(ChatError::NotFound),
        }
    }

    /// All conversations owned by the caller, most recently updated
    /// first. An empty list is a normal outcome, not an error.
    pub async fn list_conversations(&self, owner_id: &str) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.store.find_by_owner(owner_id).await?)
    }

    /// Deletes one owned conversation. Takes the same per-ID lock as
    /// `continue_conversation`, so a delete cannot land between an
    /// in-flight follow-up's read and its writes.
    pub async fn delete_conversation(
        &self,
        owner_id: &str,
        conversation_id: Uuid,
    ) -> Result<(), ChatError> {
        let lock = self.lock_for(conversation_id).await;
        let _serialized = lock.lock().await;

        match self.store.get(conversation_id).await? {
            Some(conversation) if conversation.owner_id() == owner_id => {
                self.store.delete(conversation_id).await?;
                self.locks.lock().await.remove(&conversation_id);
                Ok(())
            }
            _ => Err(ChatError::NotFound),
        }
    }

    /// Deletes every conversation owned by the caller. Idempotent; a
    /// caller with nothing to delete still succeeds.
    pub async fn delete_all(&self, owner_id: &str) -> Result<(), ChatError> {
        let owned = self.store.find_by_owner(owner_id).await?;
        let removed = self.store.delete_by_owner(owner_id).await?;

        let mut locks = self.locks.lock().await;
        for conversation in &owned {
            locks.remove(&conversation.id());
        }
        debug!("[Chat] deleted {removed} conversations for owner: {owner_id}");
        Ok(())
    }

    async fn lock_for(&self, conversation_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(conversation_id)
            .or_default()
            .clone()
    }
}

fn validate(request: &NewConversation) -> Result<(), ChatError> {
    if request.partner_name.trim().is_empty() {
        return Err(ChatError::Validation("partner_name is required".to_string()));
    }
    if request.concern.trim().is_empty() {
        return Err(ChatError::Validation("concern is required".to_string()));
    }
    Ok(())
}
