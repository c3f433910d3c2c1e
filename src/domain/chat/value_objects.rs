use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::ChatError;

// ============================================================================
// Chat Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub Uuid);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-assigned message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Client-generated correlation key for an optimistic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(pub Uuid);

impl TempId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TempId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum Sender {
    #[serde(rename_all = "camelCase")]
    Staff { staff_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Customer { customer_id: CustomerId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<TempId>,
    pub conversation_id: ConversationId,
    pub sender: Sender,
    pub text_content: Option<String>,
    pub image_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Local copy shown before the server confirms the message
    pub fn optimistic(conversation_id: ConversationId, sender: Sender, draft: &MessageDraft) -> Self {
        Self {
            message_id: None,
            temp_id: Some(draft.temp_id),
            conversation_id,
            sender,
            text_content: draft.text_content.clone(),
            image_content: draft.image_content.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.message_id.is_some()
    }
}

/// Body of `POST /chats/{customerId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub temp_id: TempId,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub image_content: Option<String>,
}

impl MessageDraft {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            temp_id: TempId::new(),
            text_content: Some(text.into()),
            image_content: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            temp_id: TempId::new(),
            text_content: None,
            image_content: Some(url.into()),
        }
    }

    /// Trims content; blank parts are dropped and at least one must remain
    pub fn validate(self) -> Result<Self, ChatError> {
        let clean = |part: Option<String>| {
            part.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        let text_content = clean(self.text_content);
        let image_content = clean(self.image_content);

        if text_content.is_none() && image_content.is_none() {
            return Err(ChatError::EmptyMessage);
        }

        Ok(Self {
            temp_id: self.temp_id,
            text_content,
            image_content,
        })
    }
}

/// Payload of the live `message:new` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub conversation_id: ConversationId,
    pub new_message: ChatMessage,
    pub temp_id: Option<TempId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: ConversationId,
    pub customer_id: CustomerId,
    pub messages: Vec<ChatMessage>,
}

/// Response of `POST /chats/{customerId}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
}
