use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::chat::ChatError;
use crate::domain::order::{OrderError, ProcessingError};
use crate::domain::order_status::StatusError;
use crate::domain::product::ProductError;
use crate::domain::scan::ScanError;
use crate::domain::staff::SessionError;
use crate::event_sourcing::store::StoreError;

// ============================================================================
// API Errors
// ============================================================================
//
// Every failure leaves the API as `{ "error": <kind>, "message": <text> }`.
// The admin UI shows `message` in a toast; `kind` is also the label on the
// `api_errors_total` counter.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self { status, kind, message: message.into() }
    }

    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind, message)
    }

    fn from_store(err: &StoreError) -> Self {
        let (status, kind) = match err {
            StoreError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, "concurrency_conflict"),
            StoreError::AggregateNotFound(_) => (StatusCode::NOT_FOUND, "order_not_found"),
            StoreError::EmptyAppend => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        Self::new(status, kind, err.to_string())
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind.to_string(),
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.kind, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(self.to_error_response())
    }
}

impl From<StatusError> for ApiError {
    fn from(err: StatusError) -> Self {
        let (status, kind) = match &err {
            StatusError::UnknownStatus(_) => (StatusCode::NOT_FOUND, "unknown_status"),
            StatusError::TransitionNotAllowed { .. } => (StatusCode::CONFLICT, "transition_not_allowed"),
            StatusError::DuplicateName(_) | StatusError::DuplicateTransition { .. } => {
                (StatusCode::CONFLICT, "duplicate")
            }
            StatusError::StatusInUse(_) => (StatusCode::CONFLICT, "status_in_use"),
            StatusError::EmptyCatalog => (StatusCode::CONFLICT, "empty_catalog"),
            _ => (StatusCode::BAD_REQUEST, "invalid_status"),
        };
        Self::new(status, kind, err.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let status = match &err {
            OrderError::EmptyItems | OrderError::InvalidQuantity(_) | OrderError::MissingBarcode(_) => {
                StatusCode::BAD_REQUEST
            }
            OrderError::StatusMismatch { .. }
            | OrderError::TargetMismatch { .. }
            | OrderError::AlreadyPlaced(_) => StatusCode::CONFLICT,
            OrderError::ExplanationRequired(_) | OrderError::ScanRequired | OrderError::Scan(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            OrderError::NotInitialized => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "scan_incomplete", err.to_string())
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Status(e) => e.into(),
            ProcessingError::Order(e) => e.into(),
            ProcessingError::NoTargetSelected => Self::bad_request("no_target", err.to_string()),
            ProcessingError::Dialog(e) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let kind = match &err {
            SessionError::Forbidden(_) => "forbidden",
            SessionError::UnknownStaff(_) | SessionError::Deactivated(_) => "invalid_session",
            SessionError::SelfDeactivation => "self_deactivation",
        };
        Self::new(StatusCode::FORBIDDEN, kind, err.to_string())
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let (status, kind) = match &err {
            ChatError::EmptyMessage => (StatusCode::BAD_REQUEST, "empty_message"),
            ChatError::ConversationNotFound(_) | ChatError::CustomerNotFound(_) => {
                (StatusCode::NOT_FOUND, "conversation_not_found")
            }
            ChatError::NoOpenConversation => (StatusCode::CONFLICT, "no_open_conversation"),
            ChatError::Delivery(_) => (StatusCode::BAD_GATEWAY, "delivery_failed"),
        };
        Self::new(status, kind, err.to_string())
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        let status = match &err {
            ProductError::UnknownProduct(_) | ProductError::UnknownProductItem(_) => StatusCode::NOT_FOUND,
            ProductError::DuplicateBarcode(_) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store(&err)
    }
}

/// Orchestration errors carry a typed domain error underneath when there is one
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<SessionError>() {
            return e.clone().into();
        }
        if let Some(e) = err.downcast_ref::<StatusError>() {
            return e.clone().into();
        }
        if let Some(e) = err.downcast_ref::<OrderError>() {
            return e.clone().into();
        }
        if let Some(e) = err.downcast_ref::<ScanError>() {
            return e.clone().into();
        }
        if let Some(e) = err.downcast_ref::<ChatError>() {
            return e.clone().into();
        }
        if let Some(e) = err.downcast_ref::<StoreError>() {
            return Self::from_store(e);
        }

        tracing::error!(error = %err, "Unhandled API error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error")
    }
}
