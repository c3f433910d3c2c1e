use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::live::{LiveChannel, LiveEvent};
use super::errors::ChatError;
use super::value_objects::*;

// ============================================================================
// Chat Backend
// ============================================================================

/// What a chat view needs from the server side
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn fetch_conversation(&self, conversation_id: ConversationId) -> Result<Conversation, ChatError>;

    async fn send_message(
        &self,
        customer_id: CustomerId,
        staff_id: Uuid,
        draft: MessageDraft,
    ) -> Result<SentMessage, ChatError>;
}

// ============================================================================
// Chat Service - in-process conversation store
// ============================================================================
//
// Persists messages, assigns MessageIds and echoes every stored message on
// the live channel as `message:new`. The echo carries the sender's TempId so
// the sending view can reconcile its optimistic entry.
//
// ============================================================================

pub struct ChatService {
    conversations: RwLock<HashMap<ConversationId, Conversation>>,
    next_message_id: AtomicI64,
    live: LiveChannel,
}

impl ChatService {
    pub fn new(live: LiveChannel) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            next_message_id: AtomicI64::new(1),
            live,
        }
    }

    pub async fn get_conversation(&self, conversation_id: ConversationId) -> Result<Conversation, ChatError> {
        self.conversations
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .ok_or(ChatError::ConversationNotFound(conversation_id))
    }

    pub async fn conversation_for_customer(&self, customer_id: CustomerId) -> Option<ConversationId> {
        self.conversations
            .read()
            .await
            .values()
            .find(|c| c.customer_id == customer_id)
            .map(|c| c.conversation_id)
    }

    /// Conversations ordered by their latest message, newest first
    pub async fn list_conversations(&self) -> Vec<Conversation> {
        let mut conversations: Vec<_> = self.conversations.read().await.values().cloned().collect();
        conversations.sort_by_key(|c| std::cmp::Reverse(c.messages.last().map(|m| m.created_at)));
        conversations
    }

    pub async fn send_to_customer(
        &self,
        customer_id: CustomerId,
        staff_id: Uuid,
        draft: MessageDraft,
    ) -> Result<SentMessage, ChatError> {
        let draft = draft.validate()?;
        let temp_id = draft.temp_id;

        let message = self
            .store(customer_id, Sender::Staff { staff_id }, draft.text_content, draft.image_content)
            .await;

        let sent = SentMessage {
            message_id: message.message_id.ok_or_else(|| ChatError::Delivery("no message id".to_string()))?,
            conversation_id: message.conversation_id,
        };

        tracing::info!(
            customer_id = %customer_id,
            conversation_id = %sent.conversation_id,
            message_id = sent.message_id.0,
            temp_id = %temp_id,
            "Staff message stored"
        );

        self.live.publish(LiveEvent::MessageNew(NewMessageEvent {
            conversation_id: sent.conversation_id,
            new_message: message,
            temp_id: Some(temp_id),
        }));

        Ok(sent)
    }

    /// Inbound message from the storefront side
    pub async fn post_from_customer(
        &self,
        customer_id: CustomerId,
        draft: MessageDraft,
    ) -> Result<ChatMessage, ChatError> {
        let draft = draft.validate()?;

        let message = self
            .store(customer_id, Sender::Customer { customer_id }, draft.text_content, draft.image_content)
            .await;

        tracing::info!(customer_id = %customer_id, conversation_id = %message.conversation_id, "Customer message stored");

        self.live.publish(LiveEvent::MessageNew(NewMessageEvent {
            conversation_id: message.conversation_id,
            new_message: message.clone(),
            temp_id: None,
        }));

        Ok(message)
    }

    async fn store(
        &self,
        customer_id: CustomerId,
        sender: Sender,
        text_content: Option<String>,
        image_content: Option<String>,
    ) -> ChatMessage {
        let mut conversations = self.conversations.write().await;

        let existing = conversations
            .values()
            .find(|c| c.customer_id == customer_id)
            .map(|c| c.conversation_id);

        let conversation_id = existing.unwrap_or_else(|| {
            let conversation_id = ConversationId(Uuid::new_v4());
            tracing::debug!(customer_id = %customer_id, conversation_id = %conversation_id, "Opening conversation");
            conversations.insert(
                conversation_id,
                Conversation { conversation_id, customer_id, messages: Vec::new() },
            );
            conversation_id
        });

        let message = ChatMessage {
            message_id: Some(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst))),
            temp_id: None,
            conversation_id,
            sender,
            text_content,
            image_content,
            created_at: Utc::now(),
        };

        if let Some(conversation) = conversations.get_mut(&conversation_id) {
            conversation.messages.push(message.clone());
        }

        message
    }
}

#[async_trait]
impl ChatBackend for ChatService {
    async fn fetch_conversation(&self, conversation_id: ConversationId) -> Result<Conversation, ChatError> {
        self.get_conversation(conversation_id).await
    }

    async fn send_message(
        &self,
        customer_id: CustomerId,
        staff_id: Uuid,
        draft: MessageDraft,
    ) -> Result<SentMessage, ChatError> {
        self.send_to_customer(customer_id, staff_id, draft).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
