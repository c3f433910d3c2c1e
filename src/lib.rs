// ============================================================================
// Saigon Steps Admin - back-office service for a footwear and accessories shop
// ============================================================================
//
// - domain/          - order statuses, orders, scan gate, chat, staff, products
// - event_sourcing/  - aggregate trait, event envelopes, in-memory event store
// - live/            - broadcast channel behind `message:new` and `order:status`
// - actors/          - chat view actor
// - api/             - actix-web routes
// - config/metrics   - ambient stack
//
// ============================================================================

pub mod actors;
pub mod api;
pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod live;
pub mod metrics;
