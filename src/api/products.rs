use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::domain::product::{ProductDetails, ProductItemDraft};
use crate::domain::staff::Permission;
use super::{ApiError, AppState};

// ============================================================================
// Product Routes
// ============================================================================

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/products", web::get().to(list_products))
        .route("/products", web::post().to(add_product))
        .route("/products/{id}", web::get().to(get_product))
        .route("/products/{id}/items", web::get().to(list_items))
        .route("/products/{id}/items", web::post().to(add_item));
}

async fn list_products(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            Ok(HttpResponse::Ok().json(state.products.list_products().await))
        })
        .await
}

async fn add_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ProductDetails>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageProducts)?;

            let product = state.products.add_product(body.into_inner()).await?;
            Ok(HttpResponse::Created().json(product))
        })
        .await
}

async fn get_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let product = state.products.get_product(path.into_inner()).await?;
            Ok(HttpResponse::Ok().json(product))
        })
        .await
}

async fn list_items(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            state.session(&req).await?;
            let items = state.products.items_for(path.into_inner()).await?;
            Ok(HttpResponse::Ok().json(items))
        })
        .await
}

async fn add_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ProductItemDraft>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageProducts)?;

            let item = state.products.add_item(path.into_inner(), body.into_inner()).await?;
            Ok(HttpResponse::Created().json(item))
        })
        .await
}
