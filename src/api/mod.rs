// ============================================================================
// HTTP API - actix-web routes for the admin UI
// ============================================================================
//
// - statuses/ - order status and transition CRUD
// - orders/   - placing orders and moving them through the status graph
// - products/ - products and their barcoded variants
// - chats/    - staff <-> customer conversations
// - staff/    - staff accounts
// - events/   - server-sent live events (`message:new`, `order:status`)
//
// Every route except /health, /metrics and /events acts on behalf of the
// staff member named by the `X-Staff-Id` header.
//
// ============================================================================

mod chats;
mod error;
mod events;
mod orders;
mod products;
mod staff;
mod statuses;

pub use error::{ApiError, ErrorResponse};

use actix_web::{web, HttpRequest, HttpResponse};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::chat::ChatService;
use crate::domain::order::{OrderCommandHandler, OrderEvent};
use crate::domain::order_status::StatusCatalog;
use crate::domain::product::ProductCatalog;
use crate::domain::staff::{SessionContext, StaffDirectory};
use crate::event_sourcing::store::EventStore;
use crate::live::LiveChannel;
use crate::metrics::{self, Metrics};

pub const STAFF_HEADER: &str = "X-Staff-Id";

/// Shared application state for the API server
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<StatusCatalog>>,
    pub orders: Arc<OrderCommandHandler>,
    pub products: Arc<ProductCatalog>,
    pub chat: Arc<ChatService>,
    pub staff: Arc<StaffDirectory>,
    pub live: LiveChannel,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(catalog: StatusCatalog, live: LiveChannel, metrics: Arc<Metrics>) -> Self {
        let catalog = Arc::new(RwLock::new(catalog));
        let event_store = Arc::new(EventStore::<OrderEvent>::new("Order"));

        Self {
            orders: Arc::new(OrderCommandHandler::new(
                event_store,
                catalog.clone(),
                live.clone(),
                metrics.clone(),
            )),
            products: Arc::new(ProductCatalog::new()),
            chat: Arc::new(ChatService::new(live.clone())),
            staff: Arc::new(StaffDirectory::new()),
            catalog,
            live,
            metrics,
        }
    }

    /// Resolves the acting staff member from the request headers
    pub async fn session(&self, req: &HttpRequest) -> Result<SessionContext, ApiError> {
        let header = req
            .headers()
            .get(STAFF_HEADER)
            .ok_or_else(|| ApiError::bad_request("missing_session", format!("{} header is required", STAFF_HEADER)))?;

        let staff_id = header
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| ApiError::bad_request("missing_session", format!("{} is not a valid id", STAFF_HEADER)))?;

        Ok(self.staff.session_for(staff_id).await?)
    }

    /// Runs a handler body; errors are logged and counted on their way out
    pub async fn respond(
        &self,
        body: impl Future<Output = Result<HttpResponse, ApiError>>,
    ) -> Result<HttpResponse, ApiError> {
        body.await.map_err(|e| self.fail(e))
    }

    pub fn fail(&self, err: impl Into<ApiError>) -> ApiError {
        let err = err.into();
        self.metrics.record_api_error(err.kind());
        tracing::warn!(kind = err.kind(), error = %err, "Request failed");
        err
    }
}

/// Registers state and every route on an actix-web app
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state.metrics.clone()))
            .app_data(web::Data::new(state))
            .route("/health", web::get().to(metrics::health_handler))
            .route("/metrics", web::get().to(metrics::metrics_handler))
            .route("/events", web::get().to(events::stream_events))
            .configure(statuses::routes)
            .configure(orders::routes)
            .configure(products::routes)
            .configure(chats::routes)
            .configure(staff::routes);
    }
}

// ============================================================================
// Test Support
// ============================================================================


#[cfg(test)]
mod tests {
    use super::test_support::test_app;
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_and_metrics_need_no_session() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());

        let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_missing_or_unknown_session() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/order-statuses").to_request()).await;
        assert_eq!(resp.status(), 400);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "missing_session");

        let req = test::TestRequest::get()
            .uri("/order-statuses")
            .insert_header((STAFF_HEADER, Uuid::new_v4().to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }
}
