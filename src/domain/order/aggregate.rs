use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::domain::order_status::StatusId;
use crate::domain::scan::{ScanConfirmation, ScanError, ScanSession};
use crate::event_sourcing::core::Aggregate;
use super::value_objects::OrderItem;
use super::events::*;
use super::commands::OrderCommand;
use super::errors::OrderError;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub from: StatusId,
    pub to: StatusId,
    pub label: String,
    pub explanation: Option<String>,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregate {
    // Identity
    pub id: Uuid,
    pub version: i64,

    // Current State (derived from events)
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status_id: StatusId,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history: Vec<StatusHistoryEntry>,

    // Set by status flags
    pub delivered_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl OrderAggregate {
    /// Events for a brand-new order; there is no prior state to consult
    pub fn place(command: &OrderCommand) -> Result<Vec<OrderEvent>, OrderError> {
        match command {
            OrderCommand::PlaceOrder { order_id, customer_id, items, initial_status } => {
                Self::validate_items(items)?;

                // Scanner input is trimmed, so stored barcodes are too
                let items = items
                    .iter()
                    .map(|item| OrderItem { barcode: item.barcode.trim().to_string(), ..item.clone() })
                    .collect();

                Ok(vec![OrderEvent::Created(OrderCreated {
                    order_id: *order_id,
                    customer_id: *customer_id,
                    items,
                    status_id: *initial_status,
                    placed_at: Utc::now(),
                })])
            }
            _ => Err(OrderError::NotInitialized),
        }
    }

    /// Fresh scan session over this order's items
    pub fn scan_session(&self) -> ScanSession {
        ScanSession::open(
            self.id,
            self.items
                .iter()
                .map(|item| (item.barcode.as_str(), u32::try_from(item.quantity).unwrap_or(0))),
        )
    }

    /// Validate business rules before emitting events
    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
            if item.barcode.trim().is_empty() {
                return Err(OrderError::MissingBarcode(item.name.clone()));
            }
        }

        Ok(())
    }

    /// Checks a confirmation covers every line of this order
    fn validate_scan(&self, scan: Option<&ScanConfirmation>) -> Result<(), OrderError> {
        let Some(scan) = scan else {
            return Err(OrderError::ScanRequired);
        };

        if scan.order_id != self.id {
            return Err(ScanError::WrongOrder { expected: self.id, found: scan.order_id }.into());
        }

        let session = self.scan_session();
        let total_lines = session.progress().total_lines;
        let scanned_lines = session
            .lines()
            .filter(|line| scan.scanned(&line.barcode) >= line.required)
            .count();

        if scanned_lines < total_lines {
            return Err(ScanError::Incomplete { scanned_lines, total_lines }.into());
        }

        Ok(())
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Created(e) => Ok(Self {
                id: e.order_id,
                version: 0,
                customer_id: e.customer_id,
                items: e.items.clone(),
                status_id: e.status_id,
                created_at: e.placed_at,
                updated_at: e.placed_at,
                history: Vec::new(),
                delivered_at: None,
                refunded_at: None,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Created(_) => {
                // First event already applied
                Ok(())
            }
            OrderEvent::StatusChanged(e) => {
                self.status_id = e.to;
                self.updated_at = e.changed_at;
                if e.effects.mark_delivered {
                    self.delivered_at = Some(e.changed_at);
                }
                if e.effects.mark_refunded {
                    self.refunded_at = Some(e.changed_at);
                }
                self.history.push(StatusHistoryEntry {
                    from: e.from,
                    to: e.to,
                    label: e.label.clone(),
                    explanation: e.explanation.clone(),
                    changed_by: e.changed_by,
                    changed_at: e.changed_at,
                });
                Ok(())
            }
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder { .. } => Err(OrderError::AlreadyPlaced(self.id)),

            OrderCommand::ChangeStatus { edge, target, explanation, scan, changed_by } => {
                if edge.from != self.status_id {
                    return Err(OrderError::StatusMismatch { current: self.status_id, from: edge.from });
                }
                if edge.to != target.id {
                    return Err(OrderError::TargetMismatch { edge_to: edge.to, requested: target.id });
                }

                let explanation = explanation
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string);

                if let Some(prompt) = target.explanation.prompt() {
                    if explanation.is_none() {
                        return Err(OrderError::ExplanationRequired(prompt.to_string()));
                    }
                }

                if edge.scanning_required {
                    self.validate_scan(scan.as_ref())?;
                }

                Ok(vec![OrderEvent::StatusChanged(OrderStatusChanged {
                    from: edge.from,
                    to: edge.to,
                    label: edge.label.clone(),
                    explanation,
                    effects: target.flags.effects(),
                    scan: if edge.scanning_required { scan.clone() } else { None },
                    changed_by: *changed_by,
                    changed_at: Utc::now(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_status::{StatusCatalog, StockMovement};

    const PENDING: StatusId = StatusId(1);
    const ACCEPTED: StatusId = StatusId(2);
    const PACKED: StatusId = StatusId(3);
    const DELIVERED: StatusId = StatusId(5);
    const CANCELLED: StatusId = StatusId(6);

    fn order_in(status_id: StatusId) -> OrderAggregate {
        OrderAggregate::apply_first_event(&OrderEvent::Created(OrderCreated {
            order_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            items: vec![
                OrderItem {
                    product_item_id: Uuid::new_v4(),
                    name: "Vans Old Skool - 40".to_string(),
                    barcode: "A".to_string(),
                    quantity: 2,
                },
                OrderItem {
                    product_item_id: Uuid::new_v4(),
                    name: "Canvas tote".to_string(),
                    barcode: "B".to_string(),
                    quantity: 1,
                },
            ],
            status_id,
            placed_at: Utc::now(),
        }))
        .unwrap()
    }

    fn change(catalog: &StatusCatalog, from: StatusId, to: StatusId) -> OrderCommand {
        OrderCommand::ChangeStatus {
            edge: catalog.table().find(from, to).unwrap().clone(),
            target: catalog.get_status(to).unwrap().clone(),
            explanation: None,
            scan: None,
            changed_by: None,
        }
    }

    fn place(items: Vec<OrderItem>) -> OrderCommand {
        OrderCommand::PlaceOrder {
            order_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            items,
            initial_status: PENDING,
        }
    }

    #[test]
    fn test_place_order() {
        let items = order_in(PENDING).items;
        let command = place(items.clone());

        let events = OrderAggregate::place(&command).unwrap();
        let order = OrderAggregate::apply_first_event(&events[0]).unwrap();

        assert_eq!(order.items, items);
        assert_eq!(order.status_id, PENDING);
        assert!(order.history.is_empty());
    }

    #[test]
    fn test_place_order_rejects_bad_items() {
        let mut item = order_in(PENDING).items[0].clone();

        assert_eq!(OrderAggregate::place(&place(vec![])).unwrap_err(), OrderError::EmptyItems);

        item.quantity = 0;
        assert_eq!(
            OrderAggregate::place(&place(vec![item.clone()])).unwrap_err(),
            OrderError::InvalidQuantity(0)
        );

        item.quantity = 1;
        item.barcode = " ".to_string();
        assert!(matches!(
            OrderAggregate::place(&place(vec![item])).unwrap_err(),
            OrderError::MissingBarcode(_)
        ));
    }

    #[test]
    fn test_padded_barcode_can_be_scanned() {
        let mut item = order_in(PENDING).items[1].clone();
        item.barcode = " B \t".to_string();

        let events = OrderAggregate::place(&place(vec![item])).unwrap();
        let order = OrderAggregate::apply_first_event(&events[0]).unwrap();
        assert_eq!(order.items[0].barcode, "B");

        let mut session = order.scan_session();
        assert!(session.record_scan("B ").is_accepted());
        assert!(session.can_submit());
    }

    #[test]
    fn test_existing_order_cannot_be_placed_again() {
        let order = order_in(PENDING);
        let result = order.handle_command(&place(order.items.clone()));
        assert_eq!(result.unwrap_err(), OrderError::AlreadyPlaced(order.id));
    }

    #[test]
    fn test_plain_transition() {
        let catalog = StatusCatalog::seeded().unwrap();
        let mut order = order_in(PENDING);

        let events = order.handle_command(&change(&catalog, PENDING, ACCEPTED)).unwrap();
        for event in &events {
            order.apply_event(event).unwrap();
        }

        assert_eq!(order.status_id, ACCEPTED);
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.history[0].label, "Accept order");
    }

    #[test]
    fn test_edge_must_start_at_current_status() {
        let catalog = StatusCatalog::seeded().unwrap();
        let order = order_in(ACCEPTED);

        let result = order.handle_command(&change(&catalog, PENDING, CANCELLED));
        assert_eq!(result.unwrap_err(), OrderError::StatusMismatch { current: ACCEPTED, from: PENDING });
    }

    #[test]
    fn test_cancellation_requires_explanation() {
        let catalog = StatusCatalog::seeded().unwrap();
        let order = order_in(PENDING);

        let result = order.handle_command(&change(&catalog, PENDING, CANCELLED));
        assert!(matches!(result.unwrap_err(), OrderError::ExplanationRequired(_)));

        let mut command = change(&catalog, PENDING, CANCELLED);
        if let OrderCommand::ChangeStatus { explanation, .. } = &mut command {
            *explanation = Some("   ".to_string());
        }
        assert!(matches!(order.handle_command(&command).unwrap_err(), OrderError::ExplanationRequired(_)));

        if let OrderCommand::ChangeStatus { explanation, .. } = &mut command {
            *explanation = Some(" Customer changed their mind ".to_string());
        }
        let events = order.handle_command(&command).unwrap();
        let OrderEvent::StatusChanged(changed) = &events[0] else {
            panic!("expected a status change");
        };
        assert_eq!(changed.explanation.as_deref(), Some("Customer changed their mind"));
        assert_eq!(changed.effects.stock, vec![StockMovement::Release]);
    }

    #[test]
    fn test_packing_requires_complete_scan() {
        let catalog = StatusCatalog::seeded().unwrap();
        let order = order_in(ACCEPTED);

        let result = order.handle_command(&change(&catalog, ACCEPTED, PACKED));
        assert_eq!(result.unwrap_err(), OrderError::ScanRequired);

        let mut session = order.scan_session();
        session.record_scan("A");
        session.record_scan("A");
        session.record_scan("B");

        let mut command = change(&catalog, ACCEPTED, PACKED);
        if let OrderCommand::ChangeStatus { scan, .. } = &mut command {
            *scan = Some(session.confirm().unwrap());
        }

        let events = order.handle_command(&command).unwrap();
        let OrderEvent::StatusChanged(changed) = &events[0] else {
            panic!("expected a status change");
        };
        assert!(changed.scan.is_some());
    }

    #[test]
    fn test_scan_for_another_order_is_rejected() {
        let catalog = StatusCatalog::seeded().unwrap();
        let order = order_in(ACCEPTED);
        let other = order_in(ACCEPTED);

        let mut session = other.scan_session();
        for barcode in ["A", "A", "B"] {
            session.record_scan(barcode);
        }

        let mut command = change(&catalog, ACCEPTED, PACKED);
        if let OrderCommand::ChangeStatus { scan, .. } = &mut command {
            *scan = Some(session.confirm().unwrap());
        }

        assert!(matches!(
            order.handle_command(&command).unwrap_err(),
            OrderError::Scan(ScanError::WrongOrder { .. })
        ));
    }

    #[test]
    fn test_delivery_flag_sets_timestamp() {
        let catalog = StatusCatalog::seeded().unwrap();
        let mut order = order_in(StatusId(4));

        let events = order.handle_command(&change(&catalog, StatusId(4), DELIVERED)).unwrap();
        order.apply_event(&events[0]).unwrap();

        assert_eq!(order.status_id, DELIVERED);
        assert!(order.delivered_at.is_some());
        assert!(order.refunded_at.is_none());
    }

    #[test]
    fn test_status_change_cannot_start_an_order() {
        let catalog = StatusCatalog::seeded().unwrap();
        let order = order_in(PENDING);
        let events = order.handle_command(&change(&catalog, PENDING, ACCEPTED)).unwrap();

        let result = OrderAggregate::apply_first_event(&events[0]);
        assert!(matches!(result, Err(OrderError::NotInitialized)));
    }
}
