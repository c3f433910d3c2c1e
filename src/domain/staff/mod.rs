// ============================================================================
// Staff Domain - who is acting, and what they may do
// ============================================================================
//
// The current staff member travels as an explicit SessionContext argument
// instead of ambient global state.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod session;
pub mod directory;

pub use value_objects::*;
pub use errors::*;
pub use session::*;
pub use directory::*;
