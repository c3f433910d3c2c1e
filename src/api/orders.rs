use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{OrderAggregate, OrderProcessingDialog};
use crate::domain::order_status::{OrderStatusTransition, StatusId, TransitionTable};
use crate::domain::product::OrderLine;
use crate::domain::staff::Permission;
use super::{ApiError, AppState};

// ============================================================================
// Order Routes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub customer_id: Uuid,
    /// Product items and quantities; names and barcodes come from the product catalog
    pub items: Vec<OrderLine>,
}

/// Body of `PATCH /orders/{id}/status`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusBody {
    pub to_status_id: StatusId,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Raw scanner input, replayed in order
    #[serde(default)]
    pub scanned_barcodes: Option<Vec<String>>,
}

/// An order together with the transitions its current status offers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderAggregate,
    pub available_transitions: Vec<OrderStatusTransition>,
}

impl OrderView {
    fn new(order: OrderAggregate, table: &TransitionTable) -> Self {
        let available_transitions = table.out_edges(order.status_id).into_iter().cloned().collect();
        Self { order, available_transitions }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::get().to(list_orders))
        .route("/orders", web::post().to(place_order))
        .route("/orders/{id}", web::get().to(get_order))
        .route("/orders/{id}/events", web::get().to(order_events))
        .route("/orders/{id}/status", web::patch().to(change_status));
}

async fn list_orders(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let orders = state.orders.list().await?;
            Ok(HttpResponse::Ok().json(orders))
        })
        .await
}

async fn place_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PlaceOrderBody>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ProcessOrders)?;
            let body = body.into_inner();
            let items = state.products.order_items(&body.items).await?;

            let order_id = state
                .orders
                .place_order(&session, body.customer_id, items, Uuid::new_v4())
                .await?;
            let order = state.orders.load(order_id).await?;

            let catalog = state.catalog.read().await;
            Ok(HttpResponse::Created().json(OrderView::new(order, catalog.table())))
        })
        .await
}

async fn get_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let order = state.orders.load(path.into_inner()).await?;

            let catalog = state.catalog.read().await;
            Ok(HttpResponse::Ok().json(OrderView::new(order, catalog.table())))
        })
        .await
}

async fn order_events(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let events = state.orders.history(path.into_inner()).await?;
            Ok(HttpResponse::Ok().json(events))
        })
        .await
}

/// Runs the processing flow server-side: the scanned barcodes are replayed
/// through a fresh scan session and the change is refused unless complete.
async fn change_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ChangeStatusBody>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ProcessOrders)?;

            let order_id = path.into_inner();
            let body = body.into_inner();
            let order = state.orders.load(order_id).await?;

            let request = {
                let catalog = state.catalog.read().await;
                let mut dialog = OrderProcessingDialog::open(order)?;
                dialog.choose(catalog.table(), body.to_status_id)?;

                for barcode in body.scanned_barcodes.iter().flatten() {
                    if let Some(outcome) = dialog.record_scan(barcode) {
                        state.metrics.record_scan(outcome.label());
                        tracing::debug!(order_id = %order_id, outcome = %outcome, "Replayed scan");
                    }
                }

                dialog.submit(body.explanation)?
            };

            let updated = state
                .orders
                .change_status(&session, order_id, request, Uuid::new_v4())
                .await?;

            let catalog = state.catalog.read().await;
            Ok(HttpResponse::Ok().json(OrderView::new(updated, catalog.table())))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{test_app, TestApp};
    use super::super::{configure, ErrorResponse, STAFF_HEADER};
    use actix_web::dev::ServiceResponse;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    async fn read(resp: ServiceResponse) -> (u16, Value) {
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    macro_rules! call {
        ($app:expr, $req:expr) => {
            read(test::call_service(&$app, $req.to_request()).await).await
        };
    }

    fn place(t: &TestApp) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/orders")
            .insert_header((STAFF_HEADER, t.clerk.to_string()))
            .set_json(json!({
                "customerId": "0b6f3e5e-7c1a-4a51-9d0f-2b7f3f4b9a10",
                "items": [
                    { "productItemId": t.shoe_item, "quantity": 2 },
                    { "productItemId": t.cleaner_item, "quantity": 1 }
                ]
            }))
    }

    fn patch(t: &TestApp, order_id: &str, body: Value) -> test::TestRequest {
        test::TestRequest::patch()
            .uri(&format!("/orders/{}/status", order_id))
            .insert_header((STAFF_HEADER, t.clerk.to_string()))
            .set_json(body)
    }

    #[actix_web::test]
    async fn test_order_walks_the_status_graph() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let (status, order) = call!(app, place(&t));
        assert_eq!(status, 201);
        assert_eq!(order["statusId"], 1);
        assert_eq!(order["availableTransitions"].as_array().unwrap().len(), 2);
        assert_eq!(order["items"][0]["name"], "Converse Chuck 70 - 41");
        assert_eq!(order["items"][0]["barcode"], "A");
        let id = order["id"].as_str().unwrap().to_string();

        let (status, order) = call!(app, patch(&t, &id, json!({ "toStatusId": 2 })));
        assert_eq!(status, 200);
        assert_eq!(order["statusId"], 2);

        let (status, body) = call!(app, patch(&t, &id, json!({ "toStatusId": 3, "scannedBarcodes": ["A", "B"] })));
        assert_eq!(status, 422);
        assert_eq!(body["error"], "scan_incomplete");

        let scans = json!({ "toStatusId": 3, "scannedBarcodes": ["A", "Z", " A ", "B", "B"] });
        let (status, order) = call!(app, patch(&t, &id, scans));
        assert_eq!(status, 200);
        assert_eq!(order["statusId"], 3);
        assert_eq!(order["history"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}/events", id))
            .insert_header((STAFF_HEADER, t.clerk.to_string()));
        let (status, events) = call!(app, req);
        assert_eq!(status, 200);
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["eventType"], "OrderCreated");
        assert_eq!(events[2]["sequenceNumber"], 3);
        assert_eq!(events[2]["userId"], t.clerk.to_string());
    }

    #[actix_web::test]
    async fn test_illegal_and_unexplained_changes() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let (_, order) = call!(app, place(&t));
        let id = order["id"].as_str().unwrap().to_string();

        let (status, body) = call!(app, patch(&t, &id, json!({ "toStatusId": 5 })));
        assert_eq!(status, 409);
        assert_eq!(body["error"], "transition_not_allowed");

        let (status, body) = call!(app, patch(&t, &id, json!({ "toStatusId": 6, "explanation": "  " })));
        assert_eq!(status, 422);
        let error: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(error.error, "explanation_required");

        let reason = json!({ "toStatusId": 6, "explanation": "Out of stock in size 41" });
        let (status, order) = call!(app, patch(&t, &id, reason));
        assert_eq!(status, 200);
        assert_eq!(order["history"][0]["explanation"], "Out of stock in size 41");
        assert!(order["availableTransitions"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_order_and_bad_items() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let req = test::TestRequest::get()
            .uri("/orders/8d3c1f9e-0000-4000-8000-000000000000")
            .insert_header((STAFF_HEADER, t.clerk.to_string()));
        let (status, body) = call!(app, req);
        assert_eq!(status, 404);
        assert_eq!(body["error"], "order_not_found");

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header((STAFF_HEADER, t.clerk.to_string()))
            .set_json(json!({ "customerId": "0b6f3e5e-7c1a-4a51-9d0f-2b7f3f4b9a10", "items": [] }));
        let (status, body) = call!(app, req);
        assert_eq!(status, 400);
        assert_eq!(body["error"], "invalid_items");

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header((STAFF_HEADER, t.clerk.to_string()))
            .set_json(json!({
                "customerId": "0b6f3e5e-7c1a-4a51-9d0f-2b7f3f4b9a10",
                "items": [{ "productItemId": "8d3c1f9e-0000-4000-8000-000000000001", "quantity": 1 }]
            }));
        let (status, body) = call!(app, req);
        assert_eq!(status, 404);
        assert_eq!(body["error"], "product_not_found");

        let req = test::TestRequest::get()
            .uri("/orders/8d3c1f9e-0000-4000-8000-000000000000/events")
            .insert_header((STAFF_HEADER, t.clerk.to_string()));
        let (status, _) = call!(app, req);
        assert_eq!(status, 404);
    }
}
