use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::chat::message::Conversation;
use crate::error::StoreError;

/// Persistence seam for conversations. A real deployment backs this with
/// a document store; [`MemoryStore`] ships for tests and local runs.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, StoreError>;

    async fn update(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// All conversations owned by `owner_id`, most recently updated first.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns the number of records removed; zero is not an error.
    async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T: ConversationStore + ?Sized> ConversationStore for Arc<T> {
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        (**self).insert(conversation).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        (**self).get(id).await
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), StoreError> {
        (**self).update(conversation).await
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError> {
        (**self).find_by_owner(owner_id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, StoreError> {
        (**self).delete_by_owner(owner_id).await
    }
}

/// In-memory conversation store.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, Conversation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(conversation.id(), conversation.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&conversation.id()) {
            return Err(StoreError::Backend(format!(
                "conversation {id} vanished during update",
                id = conversation.id()
            )));
        }
        records.insert(conversation.id(), conversation.clone());
        Ok(())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let mut owned: Vec<Conversation> = self
            .records
            .read()
            .await
            .values()
            .filter(|conversation| conversation.owner_id() == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Ok(owned)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, conversation| conversation.owner_id() != owner_id);
        Ok((before - records.len()) as u64)
    }
}
