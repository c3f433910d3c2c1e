use crate::domain::order_status::StatusId;
use crate::domain::scan::ScanError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Order item '{0}' has no barcode")]
    MissingBarcode(String),

    #[error("Order is in status {current}, transition starts from {from}")]
    StatusMismatch { current: StatusId, from: StatusId },

    #[error("Transition leads to {edge_to}, requested status is {requested}")]
    TargetMismatch { edge_to: StatusId, requested: StatusId },

    #[error("An explanation is required: {0}")]
    ExplanationRequired(String),

    #[error("Scan confirmation required before this status change")]
    ScanRequired,

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Order {0} has already been placed")]
    AlreadyPlaced(uuid::Uuid),

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl OrderError {
    /// Short label for metrics and API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::EmptyItems
            | OrderError::InvalidQuantity(_)
            | OrderError::MissingBarcode(_) => "invalid_items",
            OrderError::StatusMismatch { .. } | OrderError::TargetMismatch { .. } => "stale_status",
            OrderError::ExplanationRequired(_) => "explanation_required",
            OrderError::ScanRequired | OrderError::Scan(_) => "scan_incomplete",
            OrderError::AlreadyPlaced(_) => "already_placed",
            OrderError::NotInitialized => "not_initialized",
        }
    }
}

/// Errors raised while driving the order processing dialog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Status(#[from] crate::domain::order_status::StatusError),

    #[error(transparent)]
    Dialog(#[from] crate::domain::dialog::DialogError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("No target status selected")]
    NoTargetSelected,
}
