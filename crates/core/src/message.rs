//! Message and Conversation domain types.
//!
//! These are the value objects that flow through every round-trip:
//! user types a message → session appends it → provider completes →
//! tool results are folded back in as synthetic turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (assembled prompt)
    System,
    /// The end user, or a synthetic tool-result turn
    User,
    /// The model
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create the synthetic user turn carrying a tool outcome back to the model.
    pub fn tool_result(serialized: impl AsRef<str>) -> Self {
        Self::user(format!("Tool execution result: {}", serialized.as_ref()))
    }
}

/// An ordered, append-only transcript whose first turn is always the system turn.
///
/// The only in-place mutation allowed is replacing the system turn's content
/// when the prompt is re-assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ConversationRecord")]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

/// Wire form of a [`Conversation`], checked before it becomes one.
#[derive(Deserialize)]
struct ConversationRecord {
    id: ConversationId,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConversationRecord> for Conversation {
    type Error = String;

    fn try_from(record: ConversationRecord) -> Result<Self, Self::Error> {
        let Some((first, rest)) = record.messages.split_first() else {
            return Err("conversation has no turns; expected a system turn first".into());
        };
        if first.role != Role::System {
            return Err(format!("first turn must be system, found {}", first.role.as_str()));
        }
        if rest.iter().any(|m| m.role == Role::System) {
            return Err("only the first turn may be a system turn".into());
        }
        Ok(Self {
            id: record.id,
            messages: record.messages,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Conversation {
    /// Start a conversation with its system turn.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: vec![Message::system(system_prompt)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn. System turns are rejected here; use `replace_system`.
    pub fn push(&mut self, message: Message) {
        debug_assert!(
            message.role != Role::System,
            "system turn must only be replaced, never appended"
        );
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Replace the content of turn 0, leaving every other turn in place.
    pub fn replace_system(&mut self, content: impl Into<String>) {
        self.updated_at = Utc::now();
        self.messages[0].content = content.into();
    }

    /// The current system prompt.
    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    /// All turns, system turn first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// A conversation always holds at least its system turn.
    pub fn is_empty(&self) -> bool {
        false
    }
}
