use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use posbridge_core::signature::SIGNATURE_HEADER;
use posbridge_order::{OrderError, SyncError};
use serde::Serialize;

use crate::state::AppState;

/// Every callback gets this body back, whatever the outcome.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

/// POST /api/webhooks/petpooja/order-status
///
/// Authenticated by the HMAC signature over the raw body rather than a bearer token.
pub async fn order_status_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookAck>) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let result = state.sync.handle_callback(&body, signature).await;
    state.metrics.observe_webhook(&result);

    match result {
        Ok(outcome) => (
            StatusCode::OK,
            Json(WebhookAck {
                success: true,
                message: if outcome.changed {
                    format!("Order status updated to {}", outcome.label)
                } else {
                    format!("Order already {}", outcome.label)
                },
            }),
        ),
        Err(err) => {
            let status = callback_status(&err);
            if status.is_server_error() {
                tracing::error!(error = %err, "Failed to apply POS callback");
            } else {
                tracing::warn!(error = %err, "Rejected POS callback");
            }
            (
                status,
                Json(WebhookAck {
                    success: false,
                    message: ack_message(&err),
                }),
            )
        }
    }
}

fn callback_status(err: &SyncError) -> StatusCode {
    match err {
        SyncError::Signature(_) => StatusCode::UNAUTHORIZED,
        SyncError::Validation(_) | SyncError::Precondition(_) => StatusCode::BAD_REQUEST,
        SyncError::Order(OrderError::Validation(_)) => StatusCode::BAD_REQUEST,
        SyncError::NotFound(_) => StatusCode::NOT_FOUND,
        SyncError::Order(OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        SyncError::Pos(_) | SyncError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ack_message(err: &SyncError) -> String {
    match err {
        // Never tell the caller which part of the signature check failed.
        SyncError::Signature(_) => "Invalid signature".to_string(),
        SyncError::Pos(_) | SyncError::Repository(_) => "Internal error".to_string(),
        other => other.to_string(),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/webhooks/petpooja/order-status", post(order_status_callback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use posbridge_core::SignatureError;

    #[test]
    fn test_signature_failures_share_one_message() {
        for err in [SignatureError::MissingSignature, SignatureError::Mismatch, SignatureError::Malformed] {
            let err = SyncError::Signature(err);
            assert_eq!(callback_status(&err), StatusCode::UNAUTHORIZED);
            assert_eq!(ack_message(&err), "Invalid signature");
        }
    }

    #[test]
    fn test_terminal_conflict_is_409() {
        let err = SyncError::Order(OrderError::InvalidTransition {
            from: "DELIVERED".to_string(),
            to: "ACCEPTED".to_string(),
        });
        assert_eq!(callback_status(&err), StatusCode::CONFLICT);
    }
}
