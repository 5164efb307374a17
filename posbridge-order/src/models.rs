use chrono::{DateTime, Utc};
use posbridge_core::VendorStatus;
use posbridge_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Accepted,
    Dispatched,
    FoodReady,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Accepted => "ACCEPTED",
            Self::Dispatched => "DISPATCHED",
            Self::FoodReady => "FOOD_READY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(Self::Placed),
            "ACCEPTED" => Ok(Self::Accepted),
            "DISPATCHED" => Ok(Self::Dispatched),
            "FOOD_READY" => Ok(Self::FoodReady),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(OrderError::Validation(format!("unknown order status: {}", other))),
        }
    }
}

impl From<VendorStatus> for OrderStatus {
    fn from(status: VendorStatus) -> Self {
        match status {
            VendorStatus::Cancelled => Self::Cancelled,
            VendorStatus::Accepted => Self::Accepted,
            VendorStatus::Dispatched => Self::Dispatched,
            VendorStatus::FoodReady => Self::FoodReady,
            VendorStatus::Delivered => Self::Delivered,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Delivery,
    Pickup,
    DineIn,
}

impl OrderType {
    /// Single letter code the POS uses.
    pub fn vendor_code(&self) -> &'static str {
        match self {
            Self::Delivery => "H",
            Self::Pickup => "P",
            Self::DineIn => "D",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "DELIVERY",
            Self::Pickup => "PICKUP",
            Self::DineIn => "DINE_IN",
        }
    }
}

impl FromStr for OrderType {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DELIVERY" => Ok(Self::Delivery),
            "PICKUP" => Ok(Self::Pickup),
            "DINE_IN" => Ok(Self::DineIn),
            other => Err(OrderError::Validation(format!("unknown order type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(OrderError::Validation(format!("unknown sync status: {}", other))),
        }
    }
}

/// Outcome of the last push to the POS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRecord {
    pub status: SyncStatus,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl SyncRecord {
    pub fn success() -> Self {
        Self {
            status: SyncStatus::Success,
            error: None,
            attempted_at: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: SyncStatus::Failed,
            error: Some(error.into()),
            attempted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<Masked<String>>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

/// A tax line. `rate` is the percentage as the POS displays it, `amount` is in paise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxLine {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub rate: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Addon {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub group_name: String,
    pub price: i64,
    #[serde(default = "one")]
    pub quantity: u32,
}

/// An individual menu item within an order. Prices are in paise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
    #[serde(default)]
    pub variation_id: Option<String>,
    #[serde(default)]
    pub variation_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default)]
    pub taxes: Vec<TaxLine>,
}

impl OrderItem {
    /// Price of one unit including its add-ons. `None` when the amount leaves the i64 range.
    pub fn unit_total(&self) -> Option<i64> {
        self.addons.iter().try_fold(self.unit_price, |acc, a| {
            a.price
                .checked_mul(i64::from(a.quantity))
                .and_then(|addon| acc.checked_add(addon))
        })
    }

    pub fn line_total(&self) -> Option<i64> {
        self.unit_total()?.checked_mul(i64::from(self.quantity))
    }
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Charges {
    #[serde(default)]
    pub delivery: i64,
    #[serde(default)]
    pub packing: i64,
    #[serde(default)]
    pub discount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: i64,
    pub tax_total: i64,
    pub discount_total: i64,
    pub delivery_charge: i64,
    pub packing_charge: i64,
    pub total: i64,
}

impl Totals {
    pub fn compute(items: &[OrderItem], taxes: &[TaxLine], charges: &Charges) -> Result<Self, OrderError> {
        let subtotal = items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.line_total()?))
            .ok_or_else(out_of_range)?;
        let tax_total = taxes
            .iter()
            .try_fold(0i64, |acc, t| acc.checked_add(t.amount))
            .ok_or_else(out_of_range)?;
        let gross = [tax_total, charges.delivery, charges.packing]
            .into_iter()
            .try_fold(subtotal, i64::checked_add)
            .ok_or_else(out_of_range)?;

        Ok(Self {
            subtotal,
            tax_total,
            discount_total: charges.discount,
            delivery_charge: charges.delivery,
            packing_charge: charges.packing,
            // both sides are non-negative, so this cannot overflow
            total: (gross - charges.discount).max(0),
        })
    }
}

fn out_of_range() -> OrderError {
    OrderError::Validation("amount out of range".to_string())
}

/// Last details the POS reported about preparation and delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryTracking {
    pub prep_time_minutes: Option<u32>,
    pub delivery_time_minutes: Option<u32>,
    pub rider_name: Option<String>,
    pub rider_phone: Option<String>,
    pub is_modified: bool,
    pub cancel_reason: Option<String>,
}

/// Checkout input. Totals are always computed here, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name: String,
    pub customer: Customer,
    pub order_type: OrderType,
    #[serde(default = "default_payment_type")]
    pub payment_type: String,
    #[serde(default)]
    pub table_no: Option<String>,
    #[serde(default)]
    pub persons: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub taxes: Vec<TaxLine>,
    #[serde(default)]
    pub charges: Charges,
}

fn default_payment_type() -> String {
    "COD".to_string()
}

/// A restaurant order and its POS synchronization state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub external_order_id: Option<String>,
    pub customer: Customer,
    pub order_type: OrderType,
    pub payment_type: String,
    pub table_no: Option<String>,
    pub persons: Option<u32>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub taxes: Vec<TaxLine>,
    pub charges: Charges,
    pub totals: Totals,
    pub status: OrderStatus,
    pub sync: Option<SyncRecord>,
    pub tracking: DeliveryTracking,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn create(input: NewOrder) -> Result<Self, OrderError> {
        if input.order_number.trim().is_empty() {
            return Err(OrderError::Validation("order_number is required".to_string()));
        }
        if input.restaurant_id.trim().is_empty() {
            return Err(OrderError::Validation("restaurant_id is required".to_string()));
        }
        if input.items.is_empty() {
            return Err(OrderError::Validation("order must contain at least one item".to_string()));
        }
        for item in &input.items {
            if item.quantity == 0 {
                return Err(OrderError::Validation(format!("item {} has zero quantity", item.item_id)));
            }
            if item.unit_price < 0 || item.addons.iter().any(|a| a.price < 0) {
                return Err(OrderError::Validation(format!("item {} has a negative price", item.item_id)));
            }
            if item.taxes.iter().any(|t| t.amount < 0) {
                return Err(OrderError::Validation(format!("item {} has a negative tax", item.item_id)));
            }
        }
        if input.taxes.iter().any(|t| t.amount < 0) {
            return Err(OrderError::Validation("taxes must not be negative".to_string()));
        }
        if input.persons.is_some_and(|p| i32::try_from(p).is_err()) {
            return Err(OrderError::Validation("persons out of range".to_string()));
        }
        if input.charges.delivery < 0 || input.charges.packing < 0 || input.charges.discount < 0 {
            return Err(OrderError::Validation("charges must not be negative".to_string()));
        }

        let now = Utc::now();
        let totals = Totals::compute(&input.items, &input.taxes, &input.charges)?;

        Ok(Self {
            id: Uuid::new_v4(),
            order_number: input.order_number,
            restaurant_id: input.restaurant_id,
            restaurant_name: input.restaurant_name,
            external_order_id: None,
            customer: input.customer,
            order_type: input.order_type,
            payment_type: input.payment_type,
            table_no: input.table_no,
            persons: input.persons,
            notes: input.notes,
            items: input.items,
            taxes: input.taxes,
            charges: input.charges,
            totals,
            status: OrderStatus::Placed,
            sync: None,
            tracking: DeliveryTracking::default(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move to `next`. Returns whether anything changed.
    ///
    /// Re-applying the current status is a no-op; nothing leaves a terminal status.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<bool, OrderError> {
        self.check_transition(next)?;
        if self.status == next {
            return Ok(false);
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(true)
    }

    /// Whether `transition_to(next)` would succeed, without changing anything.
    pub fn check_transition(&self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status != next && self.status.is_terminal() {
            return Err(OrderError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }

    pub fn record_sync(&mut self, record: SyncRecord) {
        self.sync = Some(record);
        self.updated_at = Utc::now();
    }

    pub fn sync_status(&self) -> Option<SyncStatus> {
        self.sync.as_ref().map(|s| s.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid order: {0}")]
    Validation(String),
}
