use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use posbridge_core::PosError;
use posbridge_order::{OrderError, SyncError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    /// The POS rejected a call or could not be reached.
    PosError {
        status: StatusCode,
        message: String,
        sync_status: Option<&'static str>,
    },
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Mark a POS failure as recorded against the order.
    pub fn with_sync_failure(self) -> Self {
        match self {
            AppError::PosError { status, message, .. } => AppError::PosError {
                status,
                message,
                sync_status: Some("failed"),
            },
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, sync_status) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::PosError { status, message, sync_status } => (status, message, sync_status),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match sync_status {
            Some(sync_status) => json!({ "error": error_message, "sync_status": sync_status }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation(msg) | SyncError::Precondition(msg) => AppError::ValidationError(msg),
            SyncError::NotFound(msg) => AppError::NotFoundError(format!("Order not found: {}", msg)),
            SyncError::Order(OrderError::Validation(msg)) => AppError::ValidationError(msg),
            SyncError::Order(err @ OrderError::InvalidTransition { .. }) => AppError::ConflictError(err.to_string()),
            SyncError::Pos(err) => err.into(),
            SyncError::Signature(err) => AppError::AuthenticationError(err.to_string()),
            SyncError::Repository(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<PosError> for AppError {
    fn from(err: PosError) -> Self {
        let status = if err.is_transport() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::BAD_REQUEST
        };
        AppError::PosError {
            status,
            message: err.message(),
            sync_status: None,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        SyncError::Order(err).into()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
