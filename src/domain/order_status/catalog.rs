use std::collections::BTreeMap;

use super::errors::StatusError;
use super::transitions::{OrderStatusTransition, TransitionTable};
use super::value_objects::*;

// ============================================================================
// Status Catalog
// ============================================================================
//
// Owns every OrderStatus and the transition edge list. All writes are
// validated here; readers get the TransitionTable for lookups.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct StatusCatalog {
    statuses: BTreeMap<StatusId, OrderStatus>,
    transitions: TransitionTable,
    next_id: i32,
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCatalog {
    pub fn new() -> Self {
        Self {
            statuses: BTreeMap::new(),
            transitions: TransitionTable::new(),
            next_id: 1,
        }
    }

    pub fn create_status(&mut self, draft: StatusDraft) -> Result<OrderStatus, StatusError> {
        let draft = draft.validate()?;
        self.ensure_unique_name(&draft.name, None)?;

        let id = StatusId(self.next_id);
        self.next_id += 1;

        let status = draft.into_status(id);
        self.statuses.insert(id, status.clone());

        tracing::info!(status_id = %id, name = %status.name, "Order status created");
        Ok(status)
    }

    pub fn update_status(&mut self, id: StatusId, draft: StatusDraft) -> Result<OrderStatus, StatusError> {
        if !self.statuses.contains_key(&id) {
            return Err(StatusError::UnknownStatus(id));
        }

        let draft = draft.validate()?;
        self.ensure_unique_name(&draft.name, Some(id))?;

        let status = draft.into_status(id);
        self.statuses.insert(id, status.clone());

        tracing::info!(status_id = %id, name = %status.name, "Order status updated");
        Ok(status)
    }

    /// Removes a status that no transition references
    pub fn delete_status(&mut self, id: StatusId) -> Result<OrderStatus, StatusError> {
        if self.transitions.references(id) {
            return Err(StatusError::StatusInUse(id));
        }
        self.statuses.remove(&id).ok_or(StatusError::UnknownStatus(id))
    }

    pub fn get_status(&self, id: StatusId) -> Result<&OrderStatus, StatusError> {
        self.statuses.get(&id).ok_or(StatusError::UnknownStatus(id))
    }

    /// All statuses ordered by id
    pub fn list_statuses(&self) -> Vec<&OrderStatus> {
        self.statuses.values().collect()
    }

    /// The status new orders start in (lowest id)
    pub fn initial_status(&self) -> Option<&OrderStatus> {
        self.statuses.values().next()
    }

    pub fn add_transition(&mut self, mut edge: OrderStatusTransition) -> Result<(), StatusError> {
        self.get_status(edge.from)?;
        self.get_status(edge.to)?;

        edge.label = edge.label.trim().to_string();
        if edge.label.is_empty() {
            return Err(StatusError::EmptyLabel);
        }

        let (from, to, scanning_required) = (edge.from, edge.to, edge.scanning_required);
        self.transitions.insert(edge)?;

        tracing::info!(from = %from, to = %to, scanning_required, "Order status transition added");
        Ok(())
    }

    pub fn remove_transition(&mut self, from: StatusId, to: StatusId) -> Result<OrderStatusTransition, StatusError> {
        self.transitions
            .remove(from, to)
            .ok_or(StatusError::TransitionNotAllowed { from, to })
    }

    /// Out-edges of an existing status
    pub fn transitions_for(&self, current: StatusId) -> Result<Vec<&OrderStatusTransition>, StatusError> {
        self.get_status(current)?;
        Ok(self.transitions.out_edges(current))
    }

    pub fn table(&self) -> &TransitionTable {
        &self.transitions
    }

    fn ensure_unique_name(&self, name: &str, except: Option<StatusId>) -> Result<(), StatusError> {
        let taken = self
            .statuses
            .values()
            .any(|s| Some(s.id) != except && s.name.eq_ignore_ascii_case(name));

        if taken {
            return Err(StatusError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Default shop lifecycle used when the service boots with an empty catalog.
    pub fn seeded() -> Result<Self, StatusError> {
        let mut catalog = Self::new();

        let pending = catalog.create_status(StatusDraft {
            name: "Pending".to_string(),
            color: "#f5a623".to_string(),
            flags: StatusFlags { reserve_stock: true, send_notification: true, ..Default::default() },
            explanation: ExplanationRequirement::NotRequired,
        })?;
        let accepted = catalog.create_status(StatusDraft {
            name: "Accepted".to_string(),
            color: "#4a90e2".to_string(),
            flags: StatusFlags { send_notification: true, ..Default::default() },
            explanation: ExplanationRequirement::NotRequired,
        })?;
        let packed = catalog.create_status(StatusDraft {
            name: "Packed".to_string(),
            color: "#9013fe".to_string(),
            flags: StatusFlags::default(),
            explanation: ExplanationRequirement::NotRequired,
        })?;
        let dispatched = catalog.create_status(StatusDraft {
            name: "Dispatched".to_string(),
            color: "#50e3c2".to_string(),
            flags: StatusFlags {
                release_stock: true,
                reduce_stock: true,
                send_notification: true,
                ..Default::default()
            },
            explanation: ExplanationRequirement::NotRequired,
        })?;
        let delivered = catalog.create_status(StatusDraft {
            name: "Delivered".to_string(),
            color: "#7ed321".to_string(),
            flags: StatusFlags { mark_delivered: true, send_notification: true, ..Default::default() },
            explanation: ExplanationRequirement::NotRequired,
        })?;
        let cancelled = catalog.create_status(StatusDraft {
            name: "Cancelled".to_string(),
            color: "#d0021b".to_string(),
            flags: StatusFlags { release_stock: true, send_notification: true, ..Default::default() },
            explanation: ExplanationRequirement::Required {
                prompt: "Reason for cancelling the order".to_string(),
            },
        })?;
        let refunded = catalog.create_status(StatusDraft {
            name: "Refunded".to_string(),
            color: "#8b572a".to_string(),
            flags: StatusFlags {
                increase_stock: true,
                mark_refunded: true,
                send_notification: true,
                ..Default::default()
            },
            explanation: ExplanationRequirement::Required {
                prompt: "Reason for the refund".to_string(),
            },
        })?;

        for edge in [
            OrderStatusTransition::new(pending.id, accepted.id, "Accept order"),
            OrderStatusTransition::new(pending.id, cancelled.id, "Cancel order"),
            OrderStatusTransition::new(accepted.id, packed.id, "Pack items").with_scanning(),
            OrderStatusTransition::new(accepted.id, cancelled.id, "Cancel order"),
            OrderStatusTransition::new(packed.id, dispatched.id, "Hand over to carrier"),
            OrderStatusTransition::new(dispatched.id, delivered.id, "Confirm delivery"),
            OrderStatusTransition::new(delivered.id, refunded.id, "Refund order"),
        ] {
            catalog.add_transition(edge)?;
        }

        Ok(catalog)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
