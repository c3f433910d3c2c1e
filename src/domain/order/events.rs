use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::domain::order_status::{StatusEffects, StatusId};
use crate::domain::scan::ScanConfirmation;
use crate::event_sourcing::core::DomainEvent;
use super::value_objects::OrderItem;

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    StatusChanged(OrderStatusChanged),
}

impl DomainEvent for OrderEvent {
    fn event_type() -> &'static str { "OrderEvent" }

    fn name(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => OrderCreated::event_type(),
            OrderEvent::StatusChanged(_) => OrderStatusChanged::event_type(),
        }
    }
}

/// Order Created - initial event in the order lifecycle
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status_id: StatusId,
    pub placed_at: DateTime<Utc>,
}

impl DomainEvent for OrderCreated {
    fn event_type() -> &'static str { "OrderCreated" }
    fn name(&self) -> &'static str { Self::event_type() }
}

/// Order Status Changed - the order moved along one transition edge
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChanged {
    pub from: StatusId,
    pub to: StatusId,
    pub label: String,
    pub explanation: Option<String>,
    pub effects: StatusEffects,
    pub scan: Option<ScanConfirmation>,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

impl DomainEvent for OrderStatusChanged {
    fn event_type() -> &'static str { "OrderStatusChanged" }
    fn name(&self) -> &'static str { Self::event_type() }
}
