use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One turn in a conversation. Immutable once appended.
///
/// `from_caller` is always set explicitly at creation; it is never
/// inferred from position in the log, and records missing the flag fail
/// deserialization rather than being silently repaired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    from_caller: bool,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn caller(text: impl Into<String>) -> Self {
        Self {
            from_caller: true,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            from_caller: false,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn from_caller(&self) -> bool {
        self.from_caller
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn speaker(&self) -> &'static str {
        if self.from_caller {
            "Caller"
        } else {
            "Assistant"
        }
    }
}

/// An advice conversation owned by one caller.
///
/// The message log is append-only: insertion order is chronological
/// order, and every append stamps `updated_at`. The owner is fixed at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: Uuid,
    owner_id: String,
    partner_name: String,
    concern: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        owner_id: impl Into<String>,
        partner_name: impl Into<String>,
        concern: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            partner_name: partner_name.into(),
            concern: concern.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn partner_name(&self) -> &str {
        &self.partner_name
    }

    pub fn concern(&self) -> &str {
        &self.concern
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn push(&mut self, message: Message) {
        self.updated_at = message.timestamp;
        self.messages.push(message);
    }

    /// Renders the full history as the prompt for a follow-up turn, one
    /// `Speaker: text` line per message in chronological order.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|message| format!("{}: {}", message.speaker(), message.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_chronological_order_and_stamps_updated_at() {
        let mut conversation = Conversation::new("u1", "Alex", "communication");
        let before = conversation.updated_at();

        conversation.push(Message::caller("first"));
        conversation.push(Message::reply("second"));

        assert_eq!(conversation.messages().len(), 2);
        assert!(conversation.messages()[0].from_caller());
        assert!(!conversation.messages()[1].from_caller());
        assert!(
            conversation.messages()[0].timestamp() <= conversation.messages()[1].timestamp()
        );
        assert!(conversation.updated_at() >= before);
        assert_eq!(
            conversation.updated_at(),
            conversation.messages()[1].timestamp()
        );
    }

    #[test]
    fn transcript_prefixes_speaker_roles() {
        let mut conversation = Conversation::new("u1", "Alex", "communication");
        conversation.push(Message::caller("We keep arguing"));
        conversation.push(Message::reply("Tell me more"));
        conversation.push(Message::caller("It started last week"));

        assert_eq!(
            conversation.transcript(),
            "Caller: We keep arguing\nAssistant: Tell me more\nCaller: It started last week"
        );
    }

    #[test]
    fn message_without_origin_flag_fails_to_deserialize() {
        let result: Result<Message, _> =
            serde_json::from_str(r#"{"text":"hi","timestamp":"2024-01-01T00:00:00Z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn conversation_round_trips_through_json() {
        let mut conversation = Conversation::new("u1", "Alex", "communication");
        conversation.push(Message::caller("hello"));

        let json = serde_json::to_string(&conversation).expect("should serialize");
        let restored: Conversation = serde_json::from_str(&json).expect("should deserialize");

        assert_eq!(restored.id(), conversation.id());
        assert_eq!(restored.owner_id(), "u1");
        assert_eq!(restored.messages().len(), 1);
        assert_eq!(restored.messages()[0].text(), "hello");
    }
}
