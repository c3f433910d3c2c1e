use chrono::{DateTime, Utc};
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::domain::chat::NewMessageEvent;
use crate::domain::order_status::StatusId;

// ============================================================================
// Live Channel - in-process fan-out of live events
// ============================================================================
//
// Every subscriber (SSE clients, chat view actors) gets its own receiver.
// Delivery is best effort: a slow subscriber that lags behind the channel
// capacity skips the events it missed.
//
// ============================================================================

/// Payload of the live `order:status` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusNotice {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub from: StatusId,
    pub to: StatusId,
    pub label: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    MessageNew(NewMessageEvent),
    OrderStatusChanged(OrderStatusNotice),
}

impl LiveEvent {
    /// Event name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::MessageNew(_) => "message:new",
            LiveEvent::OrderStatusChanged(_) => "order:status",
        }
    }

    /// JSON data of the event
    pub fn payload(&self) -> serde_json::Result<String> {
        match self {
            LiveEvent::MessageNew(event) => serde_json::to_string(event),
            LiveEvent::OrderStatusChanged(notice) => serde_json::to_string(notice),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiveChannel {
    sender: broadcast::Sender<LiveEvent>,
}

impl LiveChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that will see the event
    pub fn publish(&self, event: LiveEvent) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = name, receivers, "Published live event");
                receivers
            }
            Err(_) => {
                tracing::debug!(event = name, "No live subscribers, event dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stream view of a fresh subscription; ends when the channel closes
    pub fn stream(&self) -> BoxStream<'static, LiveEvent> {
        stream::unfold(self.subscribe(), |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Live subscriber lagged, events skipped");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

impl Default for LiveChannel {
    fn default() -> Self {
        Self::new(256)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
