//! Vendor POS wire format.
//!
//! Field names follow the vendor's JSON exactly, hence the renames. Amounts are decimal strings
//! with two fraction digits.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Fixed device identification sent with every order push.
pub const DEVICE_TYPE: &str = "Web";
pub const DEVICE_UDID: &str = "";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Details<T> {
    pub details: T,
}

impl<T> Details<T> {
    pub fn new(details: T) -> Self {
        Self { details }
    }
}

/// The `OrderInfo` object of a save-order request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderInfo {
    #[serde(rename = "Restaurant")]
    pub restaurant: Details<RestaurantDetails>,
    #[serde(rename = "Customer")]
    pub customer: Details<CustomerDetails>,
    #[serde(rename = "Order")]
    pub order: Details<OrderDetails>,
    #[serde(rename = "OrderItem")]
    pub items: Details<Vec<OrderItemDetails>>,
    #[serde(rename = "Tax")]
    pub taxes: Details<Vec<TaxDetails>>,
    #[serde(rename = "Discount")]
    pub discounts: Details<Vec<DiscountDetails>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantDetails {
    pub res_name: String,
    pub address: String,
    pub contact_information: String,
    #[serde(rename = "restID")]
    pub rest_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetails {
    pub email: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub preorder_date: String,
    pub preorder_time: String,
    pub delivery_charges: String,
    pub packing_charges: String,
    /// `H` home delivery, `P` pick up, `D` dine in
    pub order_type: String,
    pub advanced_order: String,
    pub payment_type: String,
    pub table_no: String,
    pub no_of_persons: String,
    pub discount_total: String,
    pub tax_total: String,
    pub discount_type: String,
    pub total: String,
    pub description: String,
    pub created_on: String,
    pub enable_delivery: u8,
    pub min_prep_time: u32,
    pub callback_url: String,
    pub collect_cash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemDetails {
    pub id: String,
    pub name: String,
    pub gst_liability: String,
    pub item_tax: Vec<ItemTax>,
    pub item_discount: String,
    pub price: String,
    pub final_price: String,
    pub quantity: String,
    pub description: String,
    pub variation_name: String,
    pub variation_id: String,
    #[serde(rename = "AddonItem")]
    pub addons: Details<Vec<AddonDetails>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTax {
    pub id: String,
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddonDetails {
    pub id: String,
    pub name: String,
    pub group_name: String,
    pub price: String,
    pub group_id: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxDetails {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
    pub tax: String,
    pub restaurant_liable_amt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountDetails {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
}

/// Body of the outbound status push, credentials excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdatePayload {
    #[serde(rename = "restID")]
    pub rest_id: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "clientorderID")]
    pub client_order_id: String,
    #[serde(rename = "cancelReason")]
    pub cancel_reason: String,
    pub status: String,
}

/// Body of a store open/close update, credentials excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatusUpdate {
    #[serde(rename = "restID")]
    pub rest_id: String,
    pub store_status: String,
    pub turn_on_time: String,
    pub reason: String,
}

/// What the vendor echoes back after accepting an order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveOrderAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "restID", default, deserialize_with = "opt_string_or_number")]
    pub rest_id: Option<String>,
    #[serde(rename = "clientOrderID", default, deserialize_with = "opt_string_or_number")]
    pub client_order_id: Option<String>,
    #[serde(rename = "orderID", default, deserialize_with = "opt_string_or_number")]
    pub order_id: Option<String>,
}

/// Status callback sent by the vendor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusCallback {
    #[serde(rename = "restID", deserialize_with = "string_or_number")]
    pub rest_id: String,
    #[serde(rename = "orderID", deserialize_with = "string_or_number")]
    pub order_id: String,
    #[serde(deserialize_with = "status_code")]
    pub status: i32,
    #[serde(default)]
    pub cancel_reason: Option<String>,
    #[serde(default, deserialize_with = "opt_minutes")]
    pub minimum_prep_time: Option<u32>,
    #[serde(default, deserialize_with = "opt_minutes")]
    pub minimum_delivery_time: Option<u32>,
    #[serde(default)]
    pub rider_name: Option<String>,
    #[serde(default)]
    pub rider_phone_number: Option<String>,
    #[serde(default)]
    pub is_modified: Option<String>,
}

impl StatusCallback {
    pub fn modified(&self) -> bool {
        self.is_modified
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("yes") || v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Render minor units (paise) as the vendor's two-digit decimal string.
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Interpret the vendor's success flag, which arrives as a bool, `"1"`/`"0"` or a number.
pub fn flag_is_set(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "success"),
        _ => false,
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string).filter(|s| !s.is_empty()))
}

fn status_code<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = string_or_number(deserializer)?;
    raw.trim()
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid status code: {}", raw)))
}

fn opt_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value.and_then(scalar_to_string) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid minutes: {}", s))),
    }
}
