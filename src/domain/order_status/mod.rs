// ============================================================================
// Order Status Domain - Statuses and the Transition Graph
// ============================================================================
//
// - Value objects (StatusId, OrderStatus, StatusFlags, StatusEffects)
// - Transitions (OrderStatusTransition, TransitionTable)
// - Errors (StatusError)
// - Catalog (StatusCatalog: validated status + edge CRUD, default seed)
//
// ============================================================================

pub mod value_objects;
pub mod transitions;
pub mod errors;
pub mod catalog;

pub use value_objects::*;
pub use transitions::*;
pub use errors::*;
pub use catalog::*;
