use uuid::Uuid;

use crate::domain::order_status::{OrderStatus, OrderStatusTransition, StatusId};
use crate::domain::scan::ScanConfirmation;
use super::value_objects::OrderItem;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    PlaceOrder {
        order_id: Uuid,
        customer_id: Uuid,
        items: Vec<OrderItem>,
        initial_status: StatusId,
    },
    /// Move along `edge` into `target`; the handler resolves both from the catalog
    ChangeStatus {
        edge: OrderStatusTransition,
        target: OrderStatus,
        explanation: Option<String>,
        scan: Option<ScanConfirmation>,
        changed_by: Option<Uuid>,
    },
}

/// What the processing dialog submits for a status change
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChangeRequest {
    pub to_status_id: StatusId,
    pub explanation: Option<String>,
    pub scan: Option<ScanConfirmation>,
}

impl StatusChangeRequest {
    pub fn to(to_status_id: StatusId) -> Self {
        Self {
            to_status_id,
            explanation: None,
            scan: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_scan(mut self, scan: ScanConfirmation) -> Self {
        self.scan = Some(scan);
        self
    }
}
