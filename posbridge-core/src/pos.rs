use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::credentials::Credentials;
use crate::wire::{flag_is_set, OrderInfo, SaveOrderAck, StatusUpdatePayload, StoreStatusUpdate};

/// Every failure of a vendor call. Transport problems keep their detail out of `Display`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PosError {
    #[error("POS rejected the request: {message}")]
    Api { status: Option<u16>, message: String },
    #[error("Unable to reach the POS service")]
    Transport { detail: String },
}

impl PosError {
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport { detail: detail.into() }
    }

    /// Message safe to hand back to callers.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Transport { .. } => self.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

pub type PosResult<T> = Result<T, PosError>;

/// Vendor POS operations. Every call is a single attempt.
#[async_trait]
pub trait PosGateway: Send + Sync {
    async fn save_order(&self, credentials: &Credentials, order: &OrderInfo) -> PosResult<SaveOrderAck>;

    async fn update_order_status(
        &self,
        credentials: &Credentials,
        update: &StatusUpdatePayload,
    ) -> PosResult<Value>;

    async fn fetch_menu(&self, credentials: &Credentials, restaurant_id: &str) -> PosResult<Value>;

    async fn get_store_status(&self, credentials: &Credentials, restaurant_id: &str) -> PosResult<Value>;

    async fn update_store_status(
        &self,
        credentials: &Credentials,
        update: &StoreStatusUpdate,
    ) -> PosResult<Value>;
}

/// Turn a raw vendor response into its JSON body or a [`PosError`].
///
/// Anything but HTTP 200 fails regardless of body. A 200 fails when the body is not JSON or its
/// `success` flag is missing or false.
pub fn interpret_response(status: u16, body: &str) -> PosResult<Value> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if status != 200 {
        let message = parsed
            .as_ref()
            .and_then(vendor_message)
            .unwrap_or_else(|| format!("POS returned HTTP {}", status));
        return Err(PosError::api(Some(status), message));
    }

    let value = parsed.ok_or_else(|| PosError::api(Some(status), "POS returned an unparseable response"))?;

    match value.get("success") {
        Some(flag) if flag_is_set(flag) => Ok(value),
        Some(_) => Err(PosError::api(
            Some(status),
            vendor_message(&value).unwrap_or_else(|| "POS reported failure".to_string()),
        )),
        None => Err(PosError::api(
            Some(status),
            vendor_message(&value).unwrap_or_else(|| "POS response missing success flag".to_string()),
        )),
    }
}

fn vendor_message(value: &Value) -> Option<String> {
    ["message", "msg", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body() {
        let value = interpret_response(200, r#"{"success":"1","message":"ok","orderID":"7"}"#).unwrap();
        assert_eq!(value["orderID"], "7");
    }

    #[test]
    fn test_declared_failure_carries_vendor_message() {
        let err = interpret_response(200, r#"{"success": false, "message": "duplicate order"}"#).unwrap_err();
        assert_eq!(err, PosError::api(Some(200), "duplicate order"));
        assert_eq!(err.message(), "duplicate order");
    }

    #[test]
    fn test_string_zero_is_failure() {
        let err = interpret_response(200, r#"{"success":"0","message":"Invalid access token"}"#).unwrap_err();
        assert_eq!(err.message(), "Invalid access token");
    }

    #[test]
    fn test_server_error_fails_regardless_of_body() {
        let err = interpret_response(500, r#"{"success": true, "message": "all good"}"#).unwrap_err();
        assert!(matches!(err, PosError::Api { status: Some(500), .. }));

        let err = interpret_response(500, "<html>oops</html>").unwrap_err();
        assert_eq!(err.message(), "POS returned HTTP 500");
    }

    #[test]
    fn test_non_200_success_status_is_still_failure() {
        let err = interpret_response(201, r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, PosError::Api { status: Some(201), .. }));
    }

    #[test]
    fn test_unparseable_ok_body() {
        let err = interpret_response(200, "not json").unwrap_err();
        assert_eq!(err.message(), "POS returned an unparseable response");
    }

    #[test]
    fn test_missing_flag() {
        let err = interpret_response(200, r#"{"data": []}"#).unwrap_err();
        assert_eq!(err.message(), "POS response missing success flag");
    }

    #[test]
    fn test_transport_message_is_generic() {
        let err = PosError::transport("dns error: no such host pos.internal");
        assert!(err.is_transport());
        assert!(!err.message().contains("dns"));
    }
}
