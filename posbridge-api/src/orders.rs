use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use posbridge_core::CredentialOverride;
use posbridge_order::{NewOrder, Order, SyncStatus, ValidatedStatusUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PushToPosRequest {
    pub order_id: Uuid,
    pub restaurant_id: String,
    #[serde(default)]
    pub credentials: Option<CredentialOverride>,
}

#[derive(Debug, Serialize)]
pub struct PushToPosResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Uuid,
    pub external_order_id: Option<String>,
    pub sync_status: SyncStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub order_id: Uuid,
    pub restaurant_id: String,
    pub status: String,
    #[serde(default)]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub credentials: Option<CredentialOverride>,
}

#[derive(Debug, Serialize)]
pub struct UpdateOrderStatusResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Uuid,
    pub external_order_id: String,
    pub status: String,
    pub sync_status: SyncStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = Order::create(req)?;

    state
        .sync
        .repository()
        .create_order(&order)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .sync
        .repository()
        .get_order(order_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    Ok(Json(order))
}

/// DELETE /api/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .sync
        .repository()
        .soft_delete(order_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if !deleted {
        return Err(AppError::NotFoundError(format!("Order not found: {}", order_id)));
    }

    tracing::info!(order_id = %order_id, "Order soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/orders/push-to-pos
pub async fn push_to_pos(
    State(state): State<AppState>,
    Json(req): Json<PushToPosRequest>,
) -> Result<Json<PushToPosResponse>, AppError> {
    let result = state
        .sync
        .push_order(req.order_id, &req.restaurant_id, req.credentials.as_ref())
        .await;
    state.metrics.observe_pos("save_order", &result);

    let outcome = result.map_err(|e| AppError::from(e).with_sync_failure())?;

    Ok(Json(PushToPosResponse {
        success: true,
        message: outcome.message,
        order_id: outcome.order_id,
        external_order_id: outcome.external_order_id,
        sync_status: outcome.sync_status,
    }))
}

/// POST /api/orders/update-order-status
pub async fn update_order_status(
    State(state): State<AppState>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<UpdateOrderStatusResponse>, AppError> {
    // Rejected here, before the order is loaded or the POS is called.
    let update = ValidatedStatusUpdate::new(
        req.order_id,
        &req.restaurant_id,
        &req.status,
        req.cancel_reason.as_deref(),
    )?;

    let result = state
        .sync
        .push_status(&update, req.credentials.as_ref())
        .await;
    state.metrics.observe_pos("update_order_status", &result);

    let outcome = result.map_err(|e| AppError::from(e).with_sync_failure())?;

    Ok(Json(UpdateOrderStatusResponse {
        success: true,
        message: outcome.message,
        order_id: outcome.order_id,
        external_order_id: outcome.external_order_id,
        status: outcome.order_status.to_string(),
        sync_status: outcome.sync_status,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}", get(get_order).delete(delete_order))
        .route("/api/orders/push-to-pos", post(push_to_pos))
        .route("/api/orders/update-order-status", post(update_order_status))
}
