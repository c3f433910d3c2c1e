// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable event sourcing infrastructure.
// Domain-specific code is in src/domain/
//
// ============================================================================

// Core abstractions (GENERIC - works with any aggregate)
pub mod core;
pub mod store;

pub use self::core::*;
pub use self::store::*;
