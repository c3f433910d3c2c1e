// ============================================================================
// Scan Reconciliation
// ============================================================================
//
// Barcode scans are checked against the order's items before a status
// change that requires physical confirmation can be submitted.
//
// ============================================================================

pub mod session;
pub mod errors;

pub use session::*;
pub use errors::*;
