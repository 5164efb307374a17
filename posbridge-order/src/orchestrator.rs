use posbridge_core::wire::{StatusCallback, StatusUpdatePayload, StoreStatusUpdate};
use posbridge_core::{
    CredentialOverride, Credentials, PosError, PosGateway, SignatureError, VendorStatus, WebhookVerifier,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{Order, OrderError, OrderStatus, SyncRecord, SyncStatus};
use crate::payload::build_order_info;
use crate::repository::OrderRepository;
use crate::status_update::ValidatedStatusUpdate;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Pos(#[from] PosError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl SyncError {
    fn repository(err: impl std::fmt::Display) -> Self {
        Self::Repository(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub order_id: Uuid,
    pub order_number: String,
    pub external_order_id: Option<String>,
    pub sync_status: SyncStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusPushOutcome {
    pub order_id: Uuid,
    pub external_order_id: String,
    pub status_code: i32,
    pub order_status: OrderStatus,
    pub sync_status: SyncStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackOutcome {
    pub order_id: Uuid,
    pub status: VendorStatus,
    pub label: &'static str,
    pub changed: bool,
}

/// Moves orders and their status between the local store and the vendor POS.
pub struct OrderSyncService {
    repo: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PosGateway>,
    defaults: Credentials,
    verifier: WebhookVerifier,
    callback_url: Option<String>,
}

impl OrderSyncService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PosGateway>,
        defaults: Credentials,
        verifier: WebhookVerifier,
    ) -> Self {
        Self {
            repo,
            gateway,
            defaults,
            verifier,
            callback_url: None,
        }
    }

    /// URL the POS should call back with status changes, announced with every order push.
    pub fn with_callback_url(mut self, url: Option<String>) -> Self {
        self.callback_url = url.filter(|u| !u.is_empty());
        self
    }

    pub fn repository(&self) -> &Arc<dyn OrderRepository> {
        &self.repo
    }

    /// Submit a stored order to the POS and record the outcome either way.
    pub async fn push_order(
        &self,
        order_id: Uuid,
        restaurant_id: &str,
        overrides: Option<&CredentialOverride>,
    ) -> Result<PushOutcome, SyncError> {
        let mut order = self.load_order(order_id).await?;
        ensure_restaurant(&order, restaurant_id)?;

        if order.items.is_empty() {
            return Err(SyncError::Validation("order has no items".to_string()));
        }

        let credentials = self.defaults.resolve(overrides);
        let info = build_order_info(&order, self.callback_url.as_deref())?;

        info!(order_id = %order.id, order_number = %order.order_number, "Pushing order to POS");

        match self.gateway.save_order(&credentials, &info).await {
            Ok(ack) => {
                if let Some(external_id) = ack.order_id.clone() {
                    order.external_order_id = Some(external_id);
                } else {
                    warn!(order_id = %order.id, "POS accepted order without returning an order id");
                }
                order.record_sync(SyncRecord::success());
                self.repo
                    .update_order(&order)
                    .await
                    .map_err(SyncError::repository)?;

                info!(
                    order_id = %order.id,
                    external_order_id = ?order.external_order_id,
                    "Order synced to POS"
                );

                Ok(PushOutcome {
                    order_id: order.id,
                    order_number: order.order_number,
                    external_order_id: order.external_order_id,
                    sync_status: SyncStatus::Success,
                    message: ack
                        .message
                        .unwrap_or_else(|| "Order pushed to POS".to_string()),
                })
            }
            Err(err) => {
                self.record_failure(order.id, &err).await;
                Err(err.into())
            }
        }
    }

    /// Push a validated status change. The order must already be known to the POS.
    pub async fn push_status(
        &self,
        update: &ValidatedStatusUpdate,
        overrides: Option<&CredentialOverride>,
    ) -> Result<StatusPushOutcome, SyncError> {
        let mut order = self.load_order(update.order_id()).await?;
        ensure_restaurant(&order, update.restaurant_id())?;

        let external_order_id = order.external_order_id.clone().ok_or_else(|| {
            SyncError::Precondition(format!(
                "order {} has not been synced to the POS yet",
                order.order_number
            ))
        })?;

        // A status the local order cannot take is never sent to the POS.
        let target = VendorStatus::from_code(update.code()).map(OrderStatus::from);
        if let Some(target) = target {
            order.check_transition(target)?;
        }

        let payload = StatusUpdatePayload {
            rest_id: order.restaurant_id.clone(),
            order_id: external_order_id.clone(),
            client_order_id: order.order_number.clone(),
            cancel_reason: update.cancel_reason().unwrap_or_default().to_string(),
            status: update.code().to_string(),
        };
        let credentials = self.defaults.resolve(overrides);

        info!(order_id = %order.id, status = update.code(), "Pushing status to POS");

        let response = match self.gateway.update_order_status(&credentials, &payload).await {
            Ok(response) => response,
            Err(err) => {
                self.record_failure(order.id, &err).await;
                return Err(err.into());
            }
        };

        if let Some(target) = target {
            order.transition_to(target)?;
        }
        if let Some(reason) = update.cancel_reason() {
            order.tracking.cancel_reason = Some(reason.to_string());
        }
        order.record_sync(SyncRecord::success());
        self.repo
            .update_order(&order)
            .await
            .map_err(SyncError::repository)?;

        Ok(StatusPushOutcome {
            order_id: order.id,
            external_order_id,
            status_code: update.code(),
            order_status: order.status,
            sync_status: SyncStatus::Success,
            message: response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Status pushed to POS")
                .to_string(),
        })
    }

    /// Apply a vendor status callback. Nothing is parsed or changed before the signature
    /// over the raw body verifies.
    pub async fn handle_callback(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<CallbackOutcome, SyncError> {
        self.verifier.verify(body, signature)?;

        let callback: StatusCallback = serde_json::from_slice(body)
            .map_err(|e| SyncError::Validation(format!("invalid callback payload: {}", e)))?;

        let status = VendorStatus::from_code(callback.status).ok_or_else(|| {
            SyncError::Validation(format!("unknown POS status code: {}", callback.status))
        })?;

        let mut order = self
            .repo
            .find_by_external_id(&callback.rest_id, &callback.order_id)
            .await
            .map_err(SyncError::repository)?
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "no order {} for restaurant {}",
                    callback.order_id, callback.rest_id
                ))
            })?;

        let changed = order.transition_to(status.into())?;
        apply_tracking(&mut order, &callback);
        self.repo
            .update_order(&order)
            .await
            .map_err(SyncError::repository)?;

        info!(
            order_id = %order.id,
            status = status.label(),
            changed,
            "Applied POS status callback"
        );

        Ok(CallbackOutcome {
            order_id: order.id,
            status,
            label: status.label(),
            changed,
        })
    }

    pub async fn fetch_menu(
        &self,
        restaurant_id: &str,
        overrides: Option<&CredentialOverride>,
    ) -> Result<Value, SyncError> {
        let restaurant_id = required_restaurant(restaurant_id)?;
        let credentials = self.defaults.resolve(overrides);
        Ok(self.gateway.fetch_menu(&credentials, restaurant_id).await?)
    }

    pub async fn get_store_status(
        &self,
        restaurant_id: &str,
        overrides: Option<&CredentialOverride>,
    ) -> Result<Value, SyncError> {
        let restaurant_id = required_restaurant(restaurant_id)?;
        let credentials = self.defaults.resolve(overrides);
        Ok(self.gateway.get_store_status(&credentials, restaurant_id).await?)
    }

    pub async fn update_store_status(
        &self,
        restaurant_id: &str,
        open: bool,
        reason: Option<&str>,
        turn_on_time: Option<&str>,
        overrides: Option<&CredentialOverride>,
    ) -> Result<Value, SyncError> {
        let restaurant_id = required_restaurant(restaurant_id)?;
        let reason = reason.map(str::trim).unwrap_or_default();
        if !open && reason.is_empty() {
            return Err(SyncError::Validation(
                "reason is required when closing the store".to_string(),
            ));
        }

        let update = StoreStatusUpdate {
            rest_id: restaurant_id.to_string(),
            store_status: if open { "1" } else { "0" }.to_string(),
            turn_on_time: turn_on_time.unwrap_or_default().to_string(),
            reason: reason.to_string(),
        };
        let credentials = self.defaults.resolve(overrides);
        Ok(self.gateway.update_store_status(&credentials, &update).await?)
    }

    async fn load_order(&self, order_id: Uuid) -> Result<Order, SyncError> {
        self.repo
            .get_order(order_id)
            .await
            .map_err(SyncError::repository)?
            .ok_or_else(|| SyncError::NotFound(order_id.to_string()))
    }

    /// Best effort: a failure here is logged and never replaces the vendor error.
    async fn record_failure(&self, order_id: Uuid, err: &PosError) {
        if let PosError::Transport { detail } = err {
            warn!(order_id = %order_id, detail = %detail, "POS transport failure");
        } else {
            warn!(order_id = %order_id, error = %err, "POS rejected request");
        }

        if let Err(record_err) = self
            .repo
            .record_sync(order_id, &SyncRecord::failed(err.message()))
            .await
        {
            error!(order_id = %order_id, error = %record_err, "Failed to record POS sync failure");
        }
    }
}

fn ensure_restaurant(order: &Order, restaurant_id: &str) -> Result<(), SyncError> {
    if order.restaurant_id != restaurant_id.trim() {
        return Err(SyncError::Validation(format!(
            "order {} does not belong to restaurant {}",
            order.order_number, restaurant_id
        )));
    }
    Ok(())
}

fn required_restaurant(restaurant_id: &str) -> Result<&str, SyncError> {
    let trimmed = restaurant_id.trim();
    if trimmed.is_empty() {
        return Err(SyncError::Validation("restaurant_id is required".to_string()));
    }
    Ok(trimmed)
}

fn apply_tracking(order: &mut Order, callback: &StatusCallback) {
    let non_empty = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    if callback.minimum_prep_time.is_some() {
        order.tracking.prep_time_minutes = callback.minimum_prep_time;
    }
    if callback.minimum_delivery_time.is_some() {
        order.tracking.delivery_time_minutes = callback.minimum_delivery_time;
    }
    if let Some(name) = non_empty(&callback.rider_name) {
        order.tracking.rider_name = Some(name);
    }
    if let Some(phone) = non_empty(&callback.rider_phone_number) {
        order.tracking.rider_phone = Some(phone);
    }
    if let Some(reason) = non_empty(&callback.cancel_reason) {
        order.tracking.cancel_reason = Some(reason);
    }
    order.tracking.is_modified = callback.modified();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryOrderRepository;
    use crate::models::fixtures;
    use async_trait::async_trait;
    use posbridge_core::signature::sign;
    use posbridge_core::wire::{OrderInfo, SaveOrderAck};
    use posbridge_core::PosResult;
    use std::sync::Mutex;

    const SECRET: &str = "webhook-secret";

    /// Gateway double that records every call and answers with a canned result.
    struct RecordingGateway {
        result: PosResult<Value>,
        calls: Mutex<Vec<(String, Credentials, Value)>>,
    }

    impl RecordingGateway {
        fn ok(body: Value) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(body),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: PosError) -> Arc<Self> {
            Arc::new(Self {
                result: Err(err),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, op: &str, credentials: &Credentials, body: Value) -> PosResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((op.to_string(), credentials.clone(), body));
            self.result.clone()
        }

        fn calls(&self) -> Vec<(String, Credentials, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PosGateway for RecordingGateway {
        async fn save_order(&self, credentials: &Credentials, order: &OrderInfo) -> PosResult<SaveOrderAck> {
            let value = self.record("save_order", credentials, serde_json::to_value(order).unwrap())?;
            Ok(serde_json::from_value(value).unwrap())
        }

        async fn update_order_status(
            &self,
            credentials: &Credentials,
            update: &StatusUpdatePayload,
        ) -> PosResult<Value> {
            self.record("update_order_status", credentials, serde_json::to_value(update).unwrap())
        }

        async fn fetch_menu(&self, credentials: &Credentials, restaurant_id: &str) -> PosResult<Value> {
            self.record("fetch_menu", credentials, Value::from(restaurant_id))
        }

        async fn get_store_status(&self, credentials: &Credentials, restaurant_id: &str) -> PosResult<Value> {
            self.record("get_store_status", credentials, Value::from(restaurant_id))
        }

        async fn update_store_status(
            &self,
            credentials: &Credentials,
            update: &StoreStatusUpdate,
        ) -> PosResult<Value> {
            self.record("update_store_status", credentials, serde_json::to_value(update).unwrap())
        }
    }

    fn defaults() -> Credentials {
        Credentials::new("key", "secret", "token")
    }

    fn service(repo: Arc<InMemoryOrderRepository>, gateway: Arc<RecordingGateway>) -> OrderSyncService {
        OrderSyncService::new(repo, gateway, defaults(), WebhookVerifier::new(Some(SECRET.to_string())))
    }

    async fn stored_order(repo: &InMemoryOrderRepository, external_id: Option<&str>) -> Order {
        let mut order = fixtures::order();
        order.external_order_id = external_id.map(str::to_string);
        repo.create_order(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_push_order_records_success_and_external_id() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({
            "success": "1", "message": "Order saved Successfully.", "orderID": "9001"
        }));
        let order = stored_order(&repo, None).await;

        let svc = service(repo.clone(), gateway.clone()).with_callback_url(Some("https://cb".to_string()));
        let outcome = svc.push_order(order.id, "rest-1", None).await.unwrap();

        assert_eq!(outcome.external_order_id.as_deref(), Some("9001"));
        assert_eq!(outcome.sync_status, SyncStatus::Success);
        assert_eq!(outcome.message, "Order saved Successfully.");

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(saved.external_order_id.as_deref(), Some("9001"));
        assert_eq!(saved.sync_status(), Some(SyncStatus::Success));

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "save_order");
        assert_eq!(calls[0].1, defaults());
        assert_eq!(calls[0].2["Order"]["details"]["callback_url"], "https://cb");
    }

    #[tokio::test]
    async fn test_push_order_uses_override_credentials() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": true, "orderID": 1}));
        let order = stored_order(&repo, None).await;

        let overrides = CredentialOverride {
            access_token: Some("request-token".into()),
            ..Default::default()
        };
        service(repo, gateway.clone())
            .push_order(order.id, "rest-1", Some(&overrides))
            .await
            .unwrap();

        assert_eq!(gateway.calls()[0].1, Credentials::new("key", "secret", "request-token"));
    }

    #[tokio::test]
    async fn test_push_order_failure_is_recorded() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::failing(PosError::api(Some(200), "duplicate order"));
        let order = stored_order(&repo, None).await;

        let err = service(repo.clone(), gateway)
            .push_order(order.id, "rest-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Pos(PosError::Api { ref message, .. }) if message == "duplicate order"));

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        let sync = saved.sync.unwrap();
        assert_eq!(sync.status, SyncStatus::Failed);
        assert_eq!(sync.error.as_deref(), Some("duplicate order"));
        assert!(saved.external_order_id.is_none());
    }

    #[tokio::test]
    async fn test_push_order_unknown_order_makes_no_call() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": true}));

        let err = service(repo, gateway.clone())
            .push_order(Uuid::new_v4(), "rest-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::NotFound(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_push_order_wrong_restaurant_rejected() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": true}));
        let order = stored_order(&repo, None).await;

        let err = service(repo, gateway.clone())
            .push_order(order.id, "rest-2", None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Validation(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_status_push_without_external_id_is_precondition_failure() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": true}));
        let order = stored_order(&repo, None).await;
        assert_eq!(order.order_number, "ORD123");

        let update = ValidatedStatusUpdate::new(order.id, "rest-1", "1", None).unwrap();
        let err = service(repo, gateway.clone())
            .push_status(&update, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Precondition(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_status_push_applies_local_transition() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": "1", "message": "Status updated"}));
        let order = stored_order(&repo, Some("9001")).await;

        let update = ValidatedStatusUpdate::new(order.id, "rest-1", "-1", Some("Out of stock")).unwrap();
        let outcome = service(repo.clone(), gateway.clone())
            .push_status(&update, None)
            .await
            .unwrap();

        assert_eq!(outcome.order_status, OrderStatus::Cancelled);
        assert_eq!(outcome.message, "Status updated");

        let body = &gateway.calls()[0].2;
        assert_eq!(body["orderID"], "9001");
        assert_eq!(body["clientorderID"], "ORD123");
        assert_eq!(body["status"], "-1");
        assert_eq!(body["cancelReason"], "Out of stock");

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(saved.status, OrderStatus::Cancelled);
        assert_eq!(saved.tracking.cancel_reason.as_deref(), Some("Out of stock"));
    }

    #[tokio::test]
    async fn test_status_push_code_zero_keeps_local_status() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": true}));
        let order = stored_order(&repo, Some("9001")).await;

        let update = ValidatedStatusUpdate::new(order.id, "rest-1", "0", None).unwrap();
        let outcome = service(repo, gateway).push_status(&update, None).await.unwrap();
        assert_eq!(outcome.order_status, OrderStatus::Placed);
    }

    #[tokio::test]
    async fn test_status_push_to_delivered_order_makes_no_call() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": "1"}));
        let mut order = stored_order(&repo, Some("9001")).await;
        order.transition_to(OrderStatus::Delivered).unwrap();
        order.record_sync(SyncRecord::failed("earlier failure"));
        repo.update_order(&order).await.unwrap();

        let update = ValidatedStatusUpdate::new(order.id, "rest-1", "1", None).unwrap();
        let err = service(repo.clone(), gateway.clone())
            .push_status(&update, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Order(OrderError::InvalidTransition { .. })));
        assert!(gateway.calls().is_empty());

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(saved.status, OrderStatus::Delivered);
        assert_eq!(saved.sync.unwrap().error.as_deref(), Some("earlier failure"));
    }

    #[tokio::test]
    async fn test_status_push_transport_failure_recorded() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::failing(PosError::transport("connection reset"));
        let order = stored_order(&repo, Some("9001")).await;

        let update = ValidatedStatusUpdate::new(order.id, "rest-1", "4", None).unwrap();
        let err = service(repo.clone(), gateway).push_status(&update, None).await.unwrap_err();
        assert!(matches!(err, SyncError::Pos(PosError::Transport { .. })));

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(saved.status, OrderStatus::Placed);
        assert_eq!(saved.sync_status(), Some(SyncStatus::Failed));
        assert_eq!(saved.sync.unwrap().error.as_deref(), Some("Unable to reach the POS service"));
    }

    #[tokio::test]
    async fn test_callback_applies_status_and_tracking() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = stored_order(&repo, Some("9001")).await;
        let svc = service(repo.clone(), RecordingGateway::ok(Value::Null));

        let body = serde_json::to_vec(&serde_json::json!({
            "restID": "rest-1",
            "orderID": "9001",
            "status": "4",
            "minimum_prep_time": "15",
            "minimum_delivery_time": 30,
            "rider_name": "Ravi",
            "rider_phone_number": "8888888888",
            "is_modified": "Yes"
        }))
        .unwrap();
        let signature = sign(SECRET.as_bytes(), &body).unwrap();

        let outcome = svc.handle_callback(&body, Some(&signature)).await.unwrap();
        assert_eq!(outcome.status, VendorStatus::Dispatched);
        assert_eq!(outcome.label, "Dispatched");
        assert!(outcome.changed);

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(saved.status, OrderStatus::Dispatched);
        assert_eq!(saved.tracking.prep_time_minutes, Some(15));
        assert_eq!(saved.tracking.delivery_time_minutes, Some(30));
        assert_eq!(saved.tracking.rider_name.as_deref(), Some("Ravi"));
        assert!(saved.tracking.is_modified);
    }

    #[tokio::test]
    async fn test_callback_with_bad_signature_changes_nothing() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = stored_order(&repo, Some("9001")).await;
        let svc = service(repo.clone(), RecordingGateway::ok(Value::Null));

        let body = br#"{"restID":"rest-1","orderID":"9001","status":"-1","cancel_reason":"x"}"#;
        let signature = sign(b"wrong-secret", body).unwrap();

        let err = svc.handle_callback(body, Some(&signature)).await.unwrap_err();
        assert!(matches!(err, SyncError::Signature(SignatureError::Mismatch)));

        let err = svc.handle_callback(body, None).await.unwrap_err();
        assert!(matches!(err, SyncError::Signature(SignatureError::MissingSignature)));

        let saved = repo.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(saved.status, OrderStatus::Placed);
    }

    #[tokio::test]
    async fn test_callback_unknown_code_rejected() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        stored_order(&repo, Some("9001")).await;
        let svc = service(repo, RecordingGateway::ok(Value::Null));

        let body = br#"{"restID":"rest-1","orderID":"9001","status":"7"}"#;
        let signature = sign(SECRET.as_bytes(), body).unwrap();
        let err = svc.handle_callback(body, Some(&signature)).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_callback_after_terminal_status_is_invalid_transition() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let mut order = stored_order(&repo, Some("9001")).await;
        order.transition_to(OrderStatus::Delivered).unwrap();
        repo.update_order(&order).await.unwrap();
        let svc = service(repo, RecordingGateway::ok(Value::Null));

        let body = br#"{"restID":"rest-1","orderID":"9001","status":"1"}"#;
        let signature = sign(SECRET.as_bytes(), body).unwrap();
        let err = svc.handle_callback(body, Some(&signature)).await.unwrap_err();
        assert!(matches!(err, SyncError::Order(OrderError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_closing_store_requires_reason() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let gateway = RecordingGateway::ok(serde_json::json!({"success": true}));
        let svc = service(repo, gateway.clone());

        let err = svc
            .update_store_status("rest-1", false, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(gateway.calls().is_empty());

        svc.update_store_status("rest-1", false, Some("Kitchen maintenance"), None, None)
            .await
            .unwrap();
        let body = &gateway.calls()[0].2;
        assert_eq!(body["store_status"], "0");
        assert_eq!(body["reason"], "Kitchen maintenance");
    }
}
