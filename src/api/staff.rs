use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::staff::{Permission, Role, StaffMember};
use super::{ApiError, AppState};

// ============================================================================
// Staff Routes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStaffBody {
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/staff", web::get().to(list_staff))
        .route("/staff", web::post().to(register_staff))
        .route("/staff/{id}/deactivate", web::post().to(deactivate_staff));
}

async fn list_staff(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStaff)?;
            Ok(HttpResponse::Ok().json(state.staff.list().await))
        })
        .await
}

async fn register_staff(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RegisterStaffBody>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ManageStaff)?;

            let body = body.into_inner();
            let (full_name, email) = (body.full_name.trim(), body.email.trim());
            if full_name.is_empty() || !email.contains('@') {
                return Err(ApiError::bad_request("invalid_staff", "A name and a valid email are required"));
            }

            let member = state.staff.register(StaffMember::new(full_name, email), body.role).await;
            Ok(HttpResponse::Created().json(member))
        })
        .await
}

async fn deactivate_staff(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            let member = state.staff.deactivate(&session, path.into_inner()).await?;
            Ok(HttpResponse::Ok().json(member))
        })
        .await
}
