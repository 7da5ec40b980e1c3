use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use counsel::error::{AiError, ChatError, ProviderError, ProviderErrorKind};
use counsel::providers::ProviderName;
use counsel::{
    AiBroker, ChatService, Config, Credentials, MemoryStore, NewConversation, ResponseBroker,
};
use uuid::Uuid;

/// Broker stub that always replies with a fixed line.
struct ScriptedBroker {
    reply: &'static str,
}

impl ScriptedBroker {
    fn new(reply: &'static str) -> Self {
        Self { reply }
    }
}

#[async_trait]
impl AiBroker for ScriptedBroker {
    async fn get_response(
        &self,
        _prompt: &str,
        _credentials: &Credentials,
    ) -> Result<String, AiError> {
        Ok(self.reply.to_string())
    }
}

/// Broker stub that holds the call open before replying, long enough for
/// another task to contend for the same conversation.
struct SlowBroker {
    delay: Duration,
    reply: &'static str,
}

#[async_trait]
impl AiBroker for SlowBroker {
    async fn get_response(
        &self,
        _prompt: &str,
        _credentials: &Credentials,
    ) -> Result<String, AiError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.to_string())
    }
}

/// Broker stub that fails every call with a fixed provider error kind.
struct FailingBroker {
    kind: ProviderErrorKind,
}

#[async_trait]
impl AiBroker for FailingBroker {
    async fn get_response(
        &self,
        _prompt: &str,
        _credentials: &Credentials,
    ) -> Result<String, AiError> {
        Err(AiError::Response(ProviderError::new(
            ProviderName::Gemini,
            self.kind,
            "scripted failure",
        )))
    }
}

/// Broker stub that the test expects never to be reached.
struct UnreachableBroker;

#[async_trait]
impl AiBroker for UnreachableBroker {
    async fn get_response(
        &self,
        _prompt: &str,
        _credentials: &Credentials,
    ) -> Result<String, AiError> {
        panic!("broker must not be invoked in this scenario");
    }
}

fn new_conversation(message: &str) -> NewConversation {
    NewConversation {
        partner_name: "Alex".to_string(),
        concern: "communication breakdown".to_string(),
        message: message.to_string(),
        caller_name: Some("Sam".to_string()),
        caller_age: Some(29),
    }
}

fn scripted_service(reply: &'static str) -> ChatService<MemoryStore> {
    ChatService::new(MemoryStore::new(), Box::new(ScriptedBroker::new(reply)))
}

#[tokio::test]
async fn submit_creates_two_messages_caller_first() {
    let service = scripted_service("Have you tried talking about it?");

    let conversation = service
        .submit(
            "u1",
            new_conversation("We keep misunderstanding each other"),
            &Credentials::default(),
        )
        .await
        .expect("submit should succeed");

    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].from_caller());
    assert_eq!(messages[0].text(), "We keep misunderstanding each other");
    assert!(!messages[1].from_caller());
    assert_eq!(messages[1].text(), "Have you tried talking about it?");
}

#[tokio::test]
async fn submit_without_default_provider_fails_before_anything_persists() {
    let broker = ResponseBroker::new(Config {
        default_gemini_key: None,
        ..Config::default()
    })
    .expect("broker should build");
    let service = ChatService::new(MemoryStore::new(), Box::new(broker));

    let result = service
        .submit(
            "u1",
            new_conversation("We keep misunderstanding each other"),
            &Credentials::default(),
        )
        .await;

    assert!(matches!(
        result,
        Err(ChatError::Ai(AiError::NoProviderAvailable))
    ));
    let owned = service
        .list_conversations("u1")
        .await
        .expect("list should succeed");
    assert!(owned.is_empty());
}

#[tokio::test]
async fn blank_partner_name_is_rejected_before_the_broker() {
    let service = ChatService::new(MemoryStore::new(), Box::new(UnreachableBroker));

    let mut request = new_conversation("hello");
    request.partner_name = "   ".to_string();

    let result = service.submit("u1", request, &Credentials::default()).await;
    assert!(matches!(result, Err(ChatError::Validation(_))));
}

#[tokio::test]
async fn blank_concern_is_rejected_before_the_broker() {
    let service = ChatService::new(MemoryStore::new(), Box::new(UnreachableBroker));

    let mut request = new_conversation("hello");
    request.concern = String::new();

    let result = service.submit("u1", request, &Credentials::default()).await;
    assert!(matches!(result, Err(ChatError::Validation(_))));
}

#[tokio::test]
async fn save_stores_one_message_and_never_calls_the_broker() {
    let service = ChatService::new(MemoryStore::new(), Box::new(UnreachableBroker));

    let conversation = service
        .save("u1", new_conversation("just logging this"))
        .await
        .expect("save should succeed");

    assert_eq!(conversation.messages().len(), 1);
    assert!(conversation.messages()[0].from_caller());
}

#[tokio::test]
async fn continue_on_missing_conversation_is_not_found_without_a_broker_call() {
    let service = ChatService::new(MemoryStore::new(), Box::new(UnreachableBroker));

    let result = service
        .continue_conversation("u1", Uuid::new_v4(), "hello?", &Credentials::default())
        .await;
    assert!(matches!(result, Err(ChatError::NotFound)));
}

#[tokio::test]
async fn continue_by_non_owner_is_forbidden_and_mutates_nothing() {
    let service = scripted_service("reply");
    let conversation = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");

    let result = service
        .continue_conversation("intruder", conversation.id(), "let me in", &Credentials::default())
        .await;
    assert!(matches!(result, Err(ChatError::Forbidden)));

    let unchanged = service
        .get_conversation("u1", conversation.id())
        .await
        .expect("owner fetch should succeed");
    assert_eq!(unchanged.messages().len(), 2);
}

#[tokio::test]
async fn n_follow_ups_yield_two_plus_two_n_alternating_messages() {
    let service = scripted_service("noted");
    let conversation = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");

    let n = 3;
    for i in 0..n {
        service
            .continue_conversation(
                "u1",
                conversation.id(),
                &format!("follow-up {i}"),
                &Credentials::default(),
            )
            .await
            .expect("continue should succeed");
    }

    let full = service
        .get_conversation("u1", conversation.id())
        .await
        .expect("fetch should succeed");
    let messages = full.messages();
    assert_eq!(messages.len(), 2 + 2 * n);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.from_caller(), i % 2 == 0, "message {i} origin");
        if i > 0 {
            assert!(messages[i - 1].timestamp() <= message.timestamp());
        }
    }
}

#[tokio::test]
async fn concurrent_follow_ups_on_one_conversation_serialize() {
    let service = Arc::new(ChatService::new(
        MemoryStore::new(),
        Box::new(SlowBroker {
            delay: Duration::from_millis(50),
            reply: "noted",
        }) as Box<dyn AiBroker>,
    ));
    let conversation = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");
    let id = conversation.id();

    let first = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .continue_conversation("u1", id, "first follow-up", &Credentials::default())
                .await
        }
    });
    let second = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .continue_conversation("u1", id, "second follow-up", &Credentials::default())
                .await
        }
    });

    first
        .await
        .expect("task should not panic")
        .expect("first follow-up should succeed");
    second
        .await
        .expect("task should not panic")
        .expect("second follow-up should succeed");

    // Neither follow-up may have read a stale history: the log holds
    // both turns, still strictly alternating.
    let full = service
        .get_conversation("u1", id)
        .await
        .expect("fetch should succeed");
    let messages = full.messages();
    assert_eq!(messages.len(), 6);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.from_caller(), i % 2 == 0, "message {i} origin");
        if i > 0 {
            assert!(messages[i - 1].timestamp() <= message.timestamp());
        }
    }
}

#[tokio::test]
async fn delete_waits_for_an_in_flight_follow_up() {
    let service = Arc::new(ChatService::new(
        MemoryStore::new(),
        Box::new(SlowBroker {
            delay: Duration::from_millis(100),
            reply: "still here",
        }) as Box<dyn AiBroker>,
    ));
    let conversation = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");
    let id = conversation.id();

    let follow_up = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .continue_conversation("u1", id, "are you there?", &Credentials::default())
                .await
        }
    });

    // Let the follow-up take the conversation lock before deleting.
    tokio::time::sleep(Duration::from_millis(20)).await;
    service
        .delete_conversation("u1", id)
        .await
        .expect("delete should succeed");

    // The follow-up held the lock, so it completed against an intact
    // record instead of failing mid-write.
    let outcome = follow_up
        .await
        .expect("task should not panic")
        .expect("follow-up should complete before the delete applies");
    assert_eq!(outcome.conversation.messages().len(), 4);

    let result = service.get_conversation("u1", id).await;
    assert!(matches!(result, Err(ChatError::NotFound)));
}

#[tokio::test]
async fn broker_failure_surfaces_its_kind_and_retains_the_caller_message() {
    let store = Arc::new(MemoryStore::new());
    let creating = ChatService::new(store.clone(), Box::new(ScriptedBroker::new("first reply")));
    let conversation = creating
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");
    let id = conversation.id();

    let failing = ChatService::new(
        store,
        Box::new(FailingBroker {
            kind: ProviderErrorKind::RateLimited,
        }),
    );

    let result = failing
        .continue_conversation("u1", id, "are you there?", &Credentials::default())
        .await;
    match result {
        Err(ChatError::Ai(AiError::Response(cause))) => {
            assert_eq!(cause.kind, ProviderErrorKind::RateLimited);
        }
        other => panic!("expected wrapped provider error, got {other:?}"),
    }

    // Retain policy: the follow-up survives the failed reply.
    let persisted = failing
        .get_conversation("u1", id)
        .await
        .expect("fetch should succeed");
    assert_eq!(persisted.messages().len(), 3);
    assert!(persisted.messages()[2].from_caller());
    assert_eq!(persisted.messages()[2].text(), "are you there?");
}

#[tokio::test]
async fn round_trip_preserves_fields_and_count() {
    let service = scripted_service("reply");
    let created = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");

    let fetched = service
        .get_conversation("u1", created.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(fetched.partner_name(), created.partner_name());
    assert_eq!(fetched.concern(), created.concern());
    assert_eq!(fetched.messages().len(), created.messages().len());
}

#[tokio::test]
async fn list_orders_by_recency_and_empty_list_is_fine() {
    let service = scripted_service("reply");

    assert!(service
        .list_conversations("u1")
        .await
        .expect("empty list should succeed")
        .is_empty());

    let first = service
        .submit("u1", new_conversation("first"), &Credentials::default())
        .await
        .expect("submit should succeed");
    let second = service
        .submit("u1", new_conversation("second"), &Credentials::default())
        .await
        .expect("submit should succeed");

    // Touch the first one so it becomes the most recent.
    service
        .continue_conversation("u1", first.id(), "back again", &Credentials::default())
        .await
        .expect("continue should succeed");

    let listed = service
        .list_conversations("u1")
        .await
        .expect("list should succeed");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id(), first.id());
    assert_eq!(listed[1].id(), second.id());
}

#[tokio::test]
async fn get_by_non_owner_reads_as_not_found() {
    let service = scripted_service("reply");
    let conversation = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");

    let result = service.get_conversation("u2", conversation.id()).await;
    assert!(matches!(result, Err(ChatError::NotFound)));
}

#[tokio::test]
async fn delete_one_requires_ownership() {
    let service = scripted_service("reply");
    let conversation = service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");

    let result = service.delete_conversation("u2", conversation.id()).await;
    assert!(matches!(result, Err(ChatError::NotFound)));

    service
        .delete_conversation("u1", conversation.id())
        .await
        .expect("owner delete should succeed");
    let result = service.get_conversation("u1", conversation.id()).await;
    assert!(matches!(result, Err(ChatError::NotFound)));
}

#[tokio::test]
async fn delete_all_is_idempotent() {
    let service = scripted_service("reply");
    service
        .submit("u1", new_conversation("opening"), &Credentials::default())
        .await
        .expect("submit should succeed");

    service.delete_all("u1").await.expect("first delete_all");
    service.delete_all("u1").await.expect("second delete_all");

    assert!(service
        .list_conversations("u1")
        .await
        .expect("list should succeed")
        .is_empty());
}
