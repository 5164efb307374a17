//! Pass-through endpoints for the POS menu and store-availability APIs.

use axum::{extract::State, routing::post, Json, Router};
use posbridge_core::CredentialOverride;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RestaurantRequest {
    pub restaurant_id: String,
    #[serde(default)]
    pub credentials: Option<CredentialOverride>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStoreStatusRequest {
    pub restaurant_id: String,
    pub open: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub turn_on_time: Option<String>,
    #[serde(default)]
    pub credentials: Option<CredentialOverride>,
}

/// POST /api/menu/fetch
pub async fn fetch_menu(
    State(state): State<AppState>,
    Json(req): Json<RestaurantRequest>,
) -> Result<Json<Value>, AppError> {
    let result = state
        .sync
        .fetch_menu(&req.restaurant_id, req.credentials.as_ref())
        .await;
    state.metrics.observe_pos("fetch_menu", &result);
    Ok(Json(result?))
}

/// POST /api/store/status
pub async fn get_store_status(
    State(state): State<AppState>,
    Json(req): Json<RestaurantRequest>,
) -> Result<Json<Value>, AppError> {
    let result = state
        .sync
        .get_store_status(&req.restaurant_id, req.credentials.as_ref())
        .await;
    state.metrics.observe_pos("get_store_status", &result);
    Ok(Json(result?))
}

/// POST /api/store/update-status
pub async fn update_store_status(
    State(state): State<AppState>,
    Json(req): Json<UpdateStoreStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let result = state
        .sync
        .update_store_status(
            &req.restaurant_id,
            req.open,
            req.reason.as_deref(),
            req.turn_on_time.as_deref(),
            req.credentials.as_ref(),
        )
        .await;
    state.metrics.observe_pos("update_store_status", &result);
    Ok(Json(result?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/menu/fetch", post(fetch_menu))
        .route("/api/store/status", post(get_store_status))
        .route("/api/store/update-status", post(update_store_status))
}
