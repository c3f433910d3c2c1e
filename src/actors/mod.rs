// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based views that live alongside the HTTP API.
//
// - chat_view/ - a staff member's open chat window, fed by the live channel
//
// Note: Domain logic (orders, statuses, chat storage) uses services and
//       command handlers, NOT actors.
//
// ============================================================================

mod chat_view;

pub use chat_view::{
    ChatViewActor,
    CloseConversation,
    GetVisibleMessages,
    OpenConversation,
    SendMessage,
};
