use serde::Serialize;

use super::value_objects::{ChatMessage, ConversationId, NewMessageEvent, TempId};

// ============================================================================
// Optimistic Message Reconciliation
// ============================================================================
//
// A sent message is shown immediately with its TempId and no MessageId. The
// live `message:new` echo carries the authoritative record plus the same
// TempId; it replaces the provisional entry at its original position.
//
// Matching order:
// 1. other conversation   -> ignored
// 2. TempId match         -> replaced in place
// 3. MessageId match      -> replaced in place (replayed echo)
// 4. otherwise            -> appended
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DeliveryState {
    Pending,
    Delivered,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleMessage {
    pub message: ChatMessage,
    pub delivery: DeliveryState,
}

impl VisibleMessage {
    pub fn pending(message: ChatMessage) -> Self {
        Self { message, delivery: DeliveryState::Pending }
    }

    pub fn delivered(message: ChatMessage) -> Self {
        Self { message, delivery: DeliveryState::Delivered }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Ignored,
    Replaced { index: usize },
    Deduplicated { index: usize },
    Appended { index: usize },
}

impl ReconcileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Ignored => "ignored",
            ReconcileOutcome::Replaced { .. } => "replaced",
            ReconcileOutcome::Deduplicated { .. } => "deduplicated",
            ReconcileOutcome::Appended { .. } => "appended",
        }
    }
}

pub fn reconcile(
    list: &mut Vec<VisibleMessage>,
    open: ConversationId,
    event: &NewMessageEvent,
) -> ReconcileOutcome {
    if event.conversation_id != open {
        return ReconcileOutcome::Ignored;
    }

    let authoritative = VisibleMessage::delivered(event.new_message.clone());

    if let Some(temp_id) = event.temp_id {
        if let Some(index) = list.iter().position(|m| m.message.temp_id == Some(temp_id)) {
            list[index] = authoritative;
            return ReconcileOutcome::Replaced { index };
        }
    }

    if let Some(message_id) = event.new_message.message_id {
        if let Some(index) = list.iter().position(|m| m.message.message_id == Some(message_id)) {
            list[index] = authoritative;
            return ReconcileOutcome::Deduplicated { index };
        }
    }

    list.push(authoritative);
    ReconcileOutcome::Appended { index: list.len() - 1 }
}

/// Flags a provisional entry whose send failed. The entry stays visible.
pub fn mark_failed(list: &mut [VisibleMessage], temp_id: TempId, reason: impl Into<String>) -> bool {
    let entry = list
        .iter_mut()
        .find(|m| m.message.temp_id == Some(temp_id) && !m.message.is_persisted());

    match entry {
        Some(entry) => {
            entry.delivery = DeliveryState::Failed { reason: reason.into() };
            true
        }
        None => false,
    }
}

/// Plain message list view of the visible entries
pub fn messages(list: &[VisibleMessage]) -> Vec<ChatMessage> {
    list.iter().map(|m| m.message.clone()).collect()
}

// ============================================================================
// Unit Tests
// ============================================================================
