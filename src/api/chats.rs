use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::domain::chat::{ConversationId, CustomerId, MessageDraft};
use crate::domain::staff::Permission;
use super::{ApiError, AppState};

// ============================================================================
// Chat Routes
// ============================================================================

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/chats", web::get().to(list_conversations))
        .route("/chats/{conversationId}", web::get().to(get_conversation))
        .route("/chats/{customerId}", web::post().to(send_message))
        .route("/storefront/chats/{customerId}", web::post().to(receive_message));
}

async fn list_conversations(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ChatWithCustomers)?;
            Ok(HttpResponse::Ok().json(state.chat.list_conversations().await))
        })
        .await
}

async fn get_conversation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ChatWithCustomers)?;

            let conversation = state.chat.get_conversation(ConversationId(path.into_inner())).await?;
            Ok(HttpResponse::Ok().json(conversation))
        })
        .await
}

/// Staff reply; the stored message is echoed on the live channel with the draft's tempId
async fn send_message(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    draft: web::Json<MessageDraft>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let session = state.session(&req).await?;
            session.ensure(Permission::ChatWithCustomers)?;

            let result = state
                .chat
                .send_to_customer(CustomerId(path.into_inner()), session.staff_id(), draft.into_inner())
                .await;
            state.metrics.record_chat_send(result.is_ok());

            let sent = result?;
            state.metrics.record_live_event("message:new");
            Ok(HttpResponse::Created().json(sent))
        })
        .await
}

/// Inbound message from the storefront widget; no staff session involved
async fn receive_message(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    draft: web::Json<MessageDraft>,
) -> Result<HttpResponse, ApiError> {
    state
        .respond(async {
            let message = state
                .chat
                .post_from_customer(CustomerId(path.into_inner()), draft.into_inner())
                .await?;
            state.metrics.record_live_event("message:new");
            Ok(HttpResponse::Created().json(message))
        })
        .await
}
