use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use anyhow::Result;

use crate::domain::order_status::{StatusCatalog, StatusError};
use crate::domain::staff::{Permission, SessionContext};
use crate::event_sourcing::core::{Aggregate, DomainEvent, EventEnvelope};
use crate::event_sourcing::store::{EventStore, StoreError};
use crate::live::{LiveChannel, LiveEvent, OrderStatusNotice};
use crate::metrics::Metrics;

use super::aggregate::OrderAggregate;
use super::commands::{OrderCommand, StatusChangeRequest};
use super::events::OrderEvent;
use super::processing::plan_status_change;
use super::value_objects::OrderItem;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Session → Catalog → Aggregate → Events → Event Store
//
// A status change is only committed when the catalog still has an edge from
// the order's current status to the requested one. Customers are notified on
// the live channel when the target status asks for it.
//
// ============================================================================

pub struct OrderCommandHandler {
    event_store: Arc<EventStore<OrderEvent>>,
    catalog: Arc<RwLock<StatusCatalog>>,
    live: LiveChannel,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        event_store: Arc<EventStore<OrderEvent>>,
        catalog: Arc<RwLock<StatusCatalog>>,
        live: LiveChannel,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { event_store, catalog, live, metrics }
    }

    /// Place a new order in the catalog's initial status
    pub async fn place_order(
        &self,
        session: &SessionContext,
        customer_id: Uuid,
        items: Vec<OrderItem>,
        correlation_id: Uuid,
    ) -> Result<Uuid> {
        session.ensure(Permission::ProcessOrders)?;

        let (initial_status, status_name) = {
            let catalog = self.catalog.read().await;
            let status = catalog.initial_status().ok_or(StatusError::EmptyCatalog)?;
            (status.id, status.name.clone())
        };

        let order_id = Uuid::new_v4();
        let command = OrderCommand::PlaceOrder { order_id, customer_id, items, initial_status };
        let events = OrderAggregate::place(&command)?;

        let envelopes = Self::wrap(order_id, 0, events, correlation_id, session.staff_id());
        self.event_store.append_events(order_id, 0, envelopes).await?;

        self.metrics.record_order_placed(&status_name);
        tracing::info!(
            order_id = %order_id,
            customer_id = %customer_id,
            status = %status_name,
            staff_id = %session.staff_id(),
            "Order placed"
        );

        Ok(order_id)
    }

    /// Move an order along one transition edge
    pub async fn change_status(
        &self,
        session: &SessionContext,
        order_id: Uuid,
        request: StatusChangeRequest,
        correlation_id: Uuid,
    ) -> Result<OrderAggregate> {
        session.ensure(Permission::ProcessOrders)?;

        let order = self.load(order_id).await?;
        let expected_version = order.version();

        let (edge, target, from_name) = {
            let catalog = self.catalog.read().await;
            let plan = plan_status_change(catalog.table(), order.status_id, request.to_status_id)
                .inspect_err(|_| self.metrics.record_status_rejection("transition_not_allowed"))?;
            let target = catalog.get_status(request.to_status_id)?.clone();
            let from_name = catalog
                .get_status(order.status_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|_| order.status_id.to_string());
            (plan.edge().clone(), target, from_name)
        };

        let command = OrderCommand::ChangeStatus {
            edge,
            target: target.clone(),
            explanation: request.explanation,
            scan: request.scan,
            changed_by: Some(session.staff_id()),
        };

        let events = order.handle_command(&command).inspect_err(|e| {
            self.metrics.record_status_rejection(e.kind());
            tracing::warn!(order_id = %order_id, reason = %e, "Status change rejected");
        })?;

        let envelopes = Self::wrap(order_id, expected_version, events, correlation_id, session.staff_id());
        self.event_store.append_events(order_id, expected_version, envelopes).await?;

        let updated = self.load(order_id).await?;
        self.metrics.record_status_change(&from_name, &target.name);

        tracing::info!(
            order_id = %order_id,
            from = %from_name,
            to = %target.name,
            version = updated.version(),
            staff_id = %session.staff_id(),
            "Order status changed"
        );

        if target.flags.effects().notify_customer {
            if let Some(entry) = updated.history.last() {
                let event = LiveEvent::OrderStatusChanged(OrderStatusNotice {
                    order_id,
                    customer_id: updated.customer_id,
                    from: entry.from,
                    to: entry.to,
                    label: entry.label.clone(),
                    changed_at: entry.changed_at,
                });
                self.metrics.record_live_event(event.name());
                self.live.publish(event);
            }
        }

        Ok(updated)
    }

    pub async fn load(&self, order_id: Uuid) -> Result<OrderAggregate> {
        self.event_store.load_aggregate::<OrderAggregate>(order_id).await
    }

    /// Audit trail of an order: who changed what, under which request
    pub async fn history(&self, order_id: Uuid) -> Result<Vec<EventEnvelope<OrderEvent>>> {
        if !self.event_store.aggregate_exists(order_id).await? {
            anyhow::bail!(StoreError::AggregateNotFound(order_id));
        }
        self.event_store.load_events(order_id).await
    }

    /// Every stored order, newest first
    pub async fn list(&self) -> Result<Vec<OrderAggregate>> {
        let mut orders = Vec::new();
        for order_id in self.event_store.aggregate_ids().await {
            orders.push(self.load(order_id).await?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    fn wrap(
        order_id: Uuid,
        expected_version: i64,
        events: Vec<OrderEvent>,
        correlation_id: Uuid,
        staff_id: Uuid,
    ) -> Vec<EventEnvelope<OrderEvent>> {
        events
            .into_iter()
            .enumerate()
            .map(|(i, event)| {
                let event_type = event.name().to_string();
                EventEnvelope::new(order_id, expected_version + i as i64 + 1, event_type, event, correlation_id)
                    .with_user(staff_id)
            })
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
