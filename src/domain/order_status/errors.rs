use super::value_objects::StatusId;

// ============================================================================
// Order Status Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatusError {
    #[error("Unknown order status: {0}")]
    UnknownStatus(StatusId),

    #[error("Status name cannot be empty")]
    EmptyName,

    #[error("A status named '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid status color: {0}")]
    InvalidColor(String),

    #[error("Conflicting stock flags: {0}")]
    ConflictingStockFlags(&'static str),

    #[error("Explanation prompt cannot be empty")]
    EmptyExplanationPrompt,

    #[error("Transition label cannot be empty")]
    EmptyLabel,

    #[error("A status cannot transition to itself: {0}")]
    SelfTransition(StatusId),

    #[error("Transition {from} -> {to} already exists")]
    DuplicateTransition { from: StatusId, to: StatusId },

    #[error("Transition {from} -> {to} is not allowed")]
    TransitionNotAllowed { from: StatusId, to: StatusId },

    #[error("Status {0} is still referenced by transitions")]
    StatusInUse(StatusId),

    #[error("No order statuses are configured")]
    EmptyCatalog,
}
