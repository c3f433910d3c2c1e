use actix_web::{web, HttpRequest, HttpResponse};

use crate::domain::order_status::{OrderStatusTransition, StatusDraft, StatusId};
use crate::domain::staff::Permission;
use super::{ApiError, AppState};

// ============================================================================
// Order Status Routes
// ============================================================================

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/order-statuses", web::get().to(list_statuses))
        .route("/order-statuses", web::post().to(create_status))
        .route("/order-statuses/{id}", web::put().to(update_status))
        .route("/order-statuses/{id}", web::delete().to(delete_status))
        .route("/order-statuses/{id}/transitions", web::get().to(list_transitions))
        .route("/order-status-transitions", web::post().to(add_transition))
        .route("/order-status-transitions/{from}/{to}", web::delete().to(remove_transition));
}

async fn list_statuses(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let catalog = state.catalog.read().await;
            Ok(HttpResponse::Ok().json(catalog.list_statuses()))
        })
        .await
}

async fn create_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    draft: web::Json<StatusDraft>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStatuses)?;

            let status = state.catalog.write().await.create_status(draft.into_inner())?;
            tracing::debug!(status_id = %status.id, staff_id = %session.staff_id(), "Status created via API");
            Ok(HttpResponse::Created().json(status))
        })
        .await
}

async fn update_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i32>,
    draft: web::Json<StatusDraft>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStatuses)?;

            let id = StatusId(path.into_inner());
            let status = state.catalog.write().await.update_status(id, draft.into_inner())?;
            tracing::debug!(status_id = %id, staff_id = %session.staff_id(), "Status updated via API");
            Ok(HttpResponse::Ok().json(status))
        })
        .await
}

async fn delete_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStatuses)?;

            let removed = state.catalog.write().await.delete_status(StatusId(path.into_inner()))?;
            tracing::info!(status_id = %removed.id, staff_id = %session.staff_id(), "Order status deleted");
            Ok(HttpResponse::Ok().json(removed))
        })
        .await
}

/// Out-edges of a status, one per button in the processing dialog
async fn list_transitions(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let catalog = state.catalog.read().await;
            let edges = catalog.transitions_for(StatusId(path.into_inner()))?;
            Ok(HttpResponse::Ok().json(edges))
        })
        .await
}

async fn add_transition(
    state: web::Data<AppState>,
    req: HttpRequest,
    edge: web::Json<OrderStatusTransition>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStatuses)?;

            let edge = edge.into_inner();
            let mut catalog = state.catalog.write().await;
            catalog.add_transition(edge.clone())?;

            let stored = catalog.table().find(edge.from, edge.to).cloned().unwrap_or(edge);
            Ok(HttpResponse::Created().json(stored))
        })
        .await
}

async fn remove_transition(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStatuses)?;

            let (from, to) = path.into_inner();
            let removed = state.catalog.write().await.remove_transition(StatusId(from), StatusId(to))?;
            tracing::info!(from = %removed.from, to = %removed.to, staff_id = %session.staff_id(), "Order status transition removed");
            Ok(HttpResponse::Ok().json(removed))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_app;
    use super::super::{configure, ErrorResponse, STAFF_HEADER};
    use crate::domain::order_status::OrderStatus;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_list_and_create_statuses() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let req = test::TestRequest::get()
            .uri("/order-statuses")
            .insert_header((STAFF_HEADER, t.clerk.to_string()))
            .to_request();
        let statuses: Vec<OrderStatus> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(statuses.len(), 7);

        let req = test::TestRequest::post()
            .uri("/order-statuses")
            .insert_header((STAFF_HEADER, t.admin.to_string()))
            .set_json(json!({ "name": "  Returned ", "color": "#AABBCC" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: OrderStatus = test::read_body_json(resp).await;
        assert_eq!(created.name, "Returned");
        assert_eq!(created.color, "#aabbcc");
    }

    #[actix_web::test]
    async fn test_clerk_cannot_edit_statuses() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let req = test::TestRequest::post()
            .uri("/order-statuses")
            .insert_header((STAFF_HEADER, t.clerk.to_string()))
            .set_json(json!({ "name": "Returned", "color": "#aabbcc" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "forbidden");
    }

    #[actix_web::test]
    async fn test_transition_crud() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;
        let admin = t.admin.to_string();

        let req = test::TestRequest::get()
            .uri("/order-statuses/2/transitions")
            .insert_header((STAFF_HEADER, admin.clone()))
            .to_request();
        let edges: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(edges.as_array().unwrap().len(), 2);
        assert_eq!(edges[0]["toStatusId"], 3);
        assert_eq!(edges[0]["scanningRequired"], true);

        let req = test::TestRequest::post()
            .uri("/order-status-transitions")
            .insert_header((STAFF_HEADER, admin.clone()))
            .set_json(json!({ "fromStatusId": 3, "toStatusId": 6, "label": "Cancel packed order" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/order-status-transitions")
            .insert_header((STAFF_HEADER, admin.clone()))
            .set_json(json!({ "fromStatusId": 3, "toStatusId": 6, "label": "Again" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::delete()
            .uri("/order-status-transitions/3/6")
            .insert_header((STAFF_HEADER, admin.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get()
            .uri("/order-statuses/99/transitions")
            .insert_header((STAFF_HEADER, admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn test_status_in_use_cannot_be_deleted() {
        let t = test_app().await;
        let app = test::init_service(App::new().configure(configure(t.state.clone()))).await;

        let req = test::TestRequest::delete()
            .uri("/order-statuses/1")
            .insert_header((STAFF_HEADER, t.admin.to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }
}
