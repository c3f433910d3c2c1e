use super::value_objects::{ConversationId, CustomerId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("A message needs text or an image")]
    EmptyMessage,

    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("No conversation with customer {0}")]
    CustomerNotFound(CustomerId),

    #[error("No conversation is open")]
    NoOpenConversation,

    #[error("Message could not be delivered: {0}")]
    Delivery(String),
}
