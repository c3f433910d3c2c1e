// ============================================================================
// Product Domain - shoes and accessories
// ============================================================================
//
// One product shape per kind, selected by a `kind` tag. Validation branches
// purely on that tag. The catalog resolves order lines into order items.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod catalog;

pub use value_objects::*;
pub use errors::*;
pub use catalog::*;
