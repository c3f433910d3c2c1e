use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::errors::StatusError;
use super::value_objects::StatusId;

// ============================================================================
// Status Transition Graph
// ============================================================================
//
// A directed edge list over statuses. Cycles are allowed; the only question
// ever asked is "what are the out-edges of my current status".
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusTransition {
    #[serde(rename = "fromStatusId")]
    pub from: StatusId,
    #[serde(rename = "toStatusId")]
    pub to: StatusId,
    pub label: String,
    #[serde(default)]
    pub scanning_required: bool,
}

impl OrderStatusTransition {
    pub fn new(from: StatusId, to: StatusId, label: impl Into<String>) -> Self {
        Self {
            from,
            to,
            label: label.into(),
            scanning_required: false,
        }
    }

    pub fn with_scanning(mut self) -> Self {
        self.scanning_required = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    edges: Vec<OrderStatusTransition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table, rejecting self-loops and duplicate edges
    pub fn from_edges(edges: impl IntoIterator<Item = OrderStatusTransition>) -> Result<Self, StatusError> {
        let mut table = Self::new();
        for edge in edges {
            table.insert(edge)?;
        }
        Ok(table)
    }

    /// Out-edges of `current`, in insertion order. Empty for a terminal status.
    pub fn out_edges(&self, current: StatusId) -> Vec<&OrderStatusTransition> {
        self.edges.iter().filter(|edge| edge.from == current).collect()
    }

    pub fn offered_targets(&self, current: StatusId) -> BTreeSet<StatusId> {
        self.out_edges(current).into_iter().map(|edge| edge.to).collect()
    }

    pub fn find(&self, from: StatusId, to: StatusId) -> Option<&OrderStatusTransition> {
        self.edges.iter().find(|edge| edge.from == from && edge.to == to)
    }

    pub fn is_terminal(&self, current: StatusId) -> bool {
        !self.edges.iter().any(|edge| edge.from == current)
    }

    pub fn references(&self, status: StatusId) -> bool {
        self.edges.iter().any(|edge| edge.from == status || edge.to == status)
    }

    pub fn insert(&mut self, edge: OrderStatusTransition) -> Result<(), StatusError> {
        if edge.from == edge.to {
            return Err(StatusError::SelfTransition(edge.from));
        }
        if self.find(edge.from, edge.to).is_some() {
            return Err(StatusError::DuplicateTransition { from: edge.from, to: edge.to });
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove(&mut self, from: StatusId, to: StatusId) -> Option<OrderStatusTransition> {
        let index = self.edges.iter().position(|edge| edge.from == from && edge.to == to)?;
        Some(self.edges.remove(index))
    }

    pub fn edges(&self) -> &[OrderStatusTransition] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PENDING: StatusId = StatusId(1);
    const ACCEPTED: StatusId = StatusId(2);
    const PACKED: StatusId = StatusId(3);
    const CANCELLED: StatusId = StatusId(6);

    fn table() -> TransitionTable {
        TransitionTable::from_edges([
            OrderStatusTransition::new(PENDING, ACCEPTED, "Accept"),
            OrderStatusTransition::new(PENDING, CANCELLED, "Cancel"),
            OrderStatusTransition::new(ACCEPTED, PACKED, "Pack").with_scanning(),
            OrderStatusTransition::new(ACCEPTED, CANCELLED, "Cancel"),
        ])
        .unwrap()
    }

    #[test]
    fn test_out_edges_follow_insertion_order() {
        let table = table();
        let labels: Vec<_> = table.out_edges(PENDING).iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Accept", "Cancel"]);
    }

    #[test]
    fn test_offered_targets_equal_out_edges() {
        let table = table();
        for current in [PENDING, ACCEPTED, PACKED, CANCELLED] {
            let expected: BTreeSet<_> = table
                .edges()
                .iter()
                .filter(|e| e.from == current)
                .map(|e| e.to)
                .collect();
            assert_eq!(table.offered_targets(current), expected);
        }
    }

    #[test]
    fn test_terminal_status_has_no_edges() {
        let table = table();
        assert!(table.out_edges(CANCELLED).is_empty());
        assert!(table.is_terminal(CANCELLED));
        assert!(!table.is_terminal(PENDING));
    }

    #[test]
    fn test_find_carries_scanning_flag() {
        let table = table();
        assert!(table.find(ACCEPTED, PACKED).unwrap().scanning_required);
        assert!(!table.find(PENDING, ACCEPTED).unwrap().scanning_required);
        assert!(table.find(PACKED, PENDING).is_none());
    }

    #[test]
    fn test_rejects_self_loop_and_duplicates() {
        let mut table = table();
        assert_eq!(
            table.insert(OrderStatusTransition::new(PACKED, PACKED, "Again")),
            Err(StatusError::SelfTransition(PACKED))
        );
        assert_eq!(
            table.insert(OrderStatusTransition::new(PENDING, ACCEPTED, "Accept twice")),
            Err(StatusError::DuplicateTransition { from: PENDING, to: ACCEPTED })
        );
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_remove_edge() {
        let mut table = table();
        let removed = table.remove(PENDING, CANCELLED).unwrap();
        assert_eq!(removed.label, "Cancel");
        assert_eq!(table.offered_targets(PENDING), BTreeSet::from([ACCEPTED]));
        assert!(table.remove(PENDING, CANCELLED).is_none());
    }

    #[test]
    fn test_transition_wire_format() {
        let edge = OrderStatusTransition::new(ACCEPTED, PACKED, "Pack").with_scanning();
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["fromStatusId"], 2);
        assert_eq!(json["toStatusId"], 3);
        assert_eq!(json["scanningRequired"], true);
    }
}
