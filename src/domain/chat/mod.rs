// ============================================================================
// Chat Domain - staff <-> customer conversations
// ============================================================================
//
// - Value objects (ids, ChatMessage, MessageDraft, NewMessageEvent)
// - Reconciliation of optimistic entries against live echoes
// - ChatBackend seam and the in-process ChatService behind the REST routes
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod reconcile;
pub mod service;

pub use value_objects::*;
pub use errors::*;
pub use reconcile::*;
pub use service::*;
