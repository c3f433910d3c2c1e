use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Not every item has been scanned yet ({scanned_lines}/{total_lines} lines complete)")]
    Incomplete { scanned_lines: usize, total_lines: usize },

    #[error("Scan confirmation belongs to order {found}, expected {expected}")]
    WrongOrder { expected: Uuid, found: Uuid },

    #[error("Order has no items to scan")]
    NothingToScan,
}
