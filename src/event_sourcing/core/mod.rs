// ============================================================================
// Event Sourcing Core - Generic Infrastructure Abstractions
// ============================================================================
//
// No domain-specific code lives here (no Order, OrderStatus, Chat, ...).
// Everything is generic over the aggregate and its event type.
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::{DomainEvent, EventEnvelope};
