// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain rules behind the back-office screens. The event-sourced order
// aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
// - Command handler
//
// This layer is completely separate from the HTTP and actor layers.
//
// ============================================================================

pub mod order;
pub mod order_status;
pub mod scan;
pub mod chat;
pub mod staff;
pub mod product;
pub mod dialog;
