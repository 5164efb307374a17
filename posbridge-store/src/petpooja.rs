//! reqwest-backed [`PosGateway`] for the Petpooja online-ordering API.

use async_trait::async_trait;
use posbridge_core::pos::interpret_response;
use posbridge_core::wire::{
    OrderInfo, SaveOrderAck, StatusUpdatePayload, StoreStatusUpdate, DEVICE_TYPE, DEVICE_UDID,
};
use posbridge_core::{Credentials, PosError, PosGateway, PosResult};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_config::Endpoints;

#[derive(Serialize)]
struct SaveOrderRequest<'a> {
    #[serde(flatten)]
    credentials: &'a Credentials,
    orderinfo: OrderInfoEnvelope<'a>,
}

#[derive(Serialize)]
struct OrderInfoEnvelope<'a> {
    #[serde(rename = "OrderInfo")]
    order_info: &'a OrderInfo,
    udid: &'static str,
    device_type: &'static str,
}

#[derive(Serialize)]
struct WithCredentials<'a, T: Serialize> {
    #[serde(flatten)]
    credentials: &'a Credentials,
    #[serde(flatten)]
    body: &'a T,
}

/// One pooled HTTP client shared by every call; the timeout is fixed at construction.
#[derive(Clone)]
pub struct PetpoojaClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl PetpoojaClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoints })
    }

    /// Single POST. Credentials go in the body unless `header_credentials` is given.
    async fn post<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        url: &str,
        header_credentials: Option<&Credentials>,
        body: &B,
    ) -> PosResult<Value> {
        let mut request = self.http.post(url).json(body);
        if let Some(c) = header_credentials {
            request = request
                .header("app-key", c.app_key.as_str())
                .header("app-secret", c.app_secret.expose().as_str())
                .header("access-token", c.access_token.expose().as_str());
        }

        let response = request.send().await.map_err(|e| {
            warn!(operation, url, error = %e, "POS request failed in transport");
            PosError::transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            warn!(operation, url, error = %e, "Failed to read POS response body");
            PosError::transport(e.to_string())
        })?;

        debug!(operation, status, "POS responded");
        interpret_response(status, &text)
    }
}

#[async_trait]
impl PosGateway for PetpoojaClient {
    async fn save_order(&self, credentials: &Credentials, order: &OrderInfo) -> PosResult<SaveOrderAck> {
        let body = SaveOrderRequest {
            credentials,
            orderinfo: OrderInfoEnvelope {
                order_info: order,
                udid: DEVICE_UDID,
                device_type: DEVICE_TYPE,
            },
        };

        let value = self
            .post("save_order", &self.endpoints.save_order, None, &body)
            .await?;

        serde_json::from_value(value)
            .map_err(|e| PosError::api(Some(200), format!("unexpected POS response: {}", e)))
    }

    async fn update_order_status(
        &self,
        credentials: &Credentials,
        update: &StatusUpdatePayload,
    ) -> PosResult<Value> {
        let body = WithCredentials { credentials, body: update };
        self.post("update_order_status", &self.endpoints.update_order_status, None, &body)
            .await
    }

    async fn fetch_menu(&self, credentials: &Credentials, restaurant_id: &str) -> PosResult<Value> {
        self.post(
            "fetch_menu",
            &self.endpoints.fetch_menu,
            Some(credentials),
            &json!({ "restID": restaurant_id }),
        )
        .await
    }

    async fn get_store_status(&self, credentials: &Credentials, restaurant_id: &str) -> PosResult<Value> {
        self.post(
            "get_store_status",
            &self.endpoints.get_store_status,
            Some(credentials),
            &json!({ "restID": restaurant_id }),
        )
        .await
    }

    async fn update_store_status(
        &self,
        credentials: &Credentials,
        update: &StoreStatusUpdate,
    ) -> PosResult<Value> {
        self.post(
            "update_store_status",
            &self.endpoints.update_store_status,
            Some(credentials),
            update,
        )
        .await
    }
}
