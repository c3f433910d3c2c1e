// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// - Value objects (OrderItem)
// - Events (OrderCreated, OrderStatusChanged)
// - Commands (PlaceOrder, ChangeStatus)
// - Errors (OrderError enum)
// - Aggregate (OrderAggregate with business logic)
// - Processing flow (ProcessingPlan, OrderProcessingDialog)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod processing;
pub mod command_handler;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use processing::*;
pub use command_handler::*;
