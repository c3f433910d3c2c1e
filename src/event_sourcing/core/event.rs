use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

// ============================================================================
// Event Envelope - Event Metadata
// ============================================================================
//
// Wraps domain events with identity, ordering and correlation metadata.
// Works with ANY event type.
//
// ============================================================================

/// Generic Event Envelope - wraps any domain event with metadata
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub sequence_number: i64,

    pub event_type: String,

    // Event Payload
    pub event_data: E,

    /// Request that produced this event
    pub correlation_id: Uuid,

    /// Staff member who triggered this event
    pub user_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        sequence_number: i64,
        event_type: String,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            sequence_number,
            event_type,
            event_data,
            correlation_id,
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// All domain events implement this trait to be stored in the event store.
pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    fn event_type() -> &'static str where Self: Sized;

    /// Name of this particular event instance, recorded on the envelope
    fn name(&self) -> &'static str;
}
