//! Order to vendor wire format.

use posbridge_core::wire::{
    format_amount, AddonDetails, CustomerDetails, Details, DiscountDetails, ItemTax, OrderDetails,
    OrderInfo, OrderItemDetails, RestaurantDetails, TaxDetails,
};

use crate::models::{Order, OrderError, OrderItem, OrderType};

/// Minimum preparation time announced to the POS, in minutes.
pub const DEFAULT_MIN_PREP_TIME: u32 = 20;

/// Fails only when an item's total does not fit in i64, which `Order::create` already rejects.
pub fn build_order_info(order: &Order, callback_url: Option<&str>) -> Result<OrderInfo, OrderError> {
    let items = order
        .items
        .iter()
        .map(item_details)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderInfo {
        restaurant: Details::new(RestaurantDetails {
            res_name: order.restaurant_name.clone(),
            address: String::new(),
            contact_information: String::new(),
            rest_id: order.restaurant_id.clone(),
        }),
        customer: Details::new(CustomerDetails {
            email: order
                .customer
                .email
                .as_ref()
                .map(|e| e.expose().clone())
                .unwrap_or_default(),
            name: order.customer.name.clone(),
            address: order.customer.address.clone(),
            phone: order.customer.phone.clone(),
            latitude: order.customer.latitude.clone().unwrap_or_default(),
            longitude: order.customer.longitude.clone().unwrap_or_default(),
        }),
        order: Details::new(order_details(order, callback_url)),
        items: Details::new(items),
        taxes: Details::new(
            order
                .taxes
                .iter()
                .map(|t| TaxDetails {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    kind: "P".to_string(),
                    price: t.rate.clone(),
                    tax: format_amount(t.amount),
                    restaurant_liable_amt: format_amount(0),
                })
                .collect(),
        ),
        discounts: Details::new(discounts(order)),
    })
}

fn order_details(order: &Order, callback_url: Option<&str>) -> OrderDetails {
    let cash_on_delivery = order.payment_type.eq_ignore_ascii_case("COD");

    OrderDetails {
        order_id: order.order_number.clone(),
        preorder_date: order.created_at.format("%Y-%m-%d").to_string(),
        preorder_time: order.created_at.format("%H:%M:%S").to_string(),
        delivery_charges: format_amount(order.totals.delivery_charge),
        packing_charges: format_amount(order.totals.packing_charge),
        order_type: order.order_type.vendor_code().to_string(),
        advanced_order: "N".to_string(),
        payment_type: order.payment_type.to_ascii_uppercase(),
        table_no: order.table_no.clone().unwrap_or_default(),
        no_of_persons: order.persons.unwrap_or(0).to_string(),
        discount_total: format_amount(order.totals.discount_total),
        tax_total: format_amount(order.totals.tax_total),
        discount_type: "F".to_string(),
        total: format_amount(order.totals.total),
        description: order.notes.clone().unwrap_or_default(),
        created_on: order.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        enable_delivery: u8::from(order.order_type == OrderType::Delivery),
        min_prep_time: DEFAULT_MIN_PREP_TIME,
        callback_url: callback_url.unwrap_or_default().to_string(),
        collect_cash: if cash_on_delivery {
            format_amount(order.totals.total)
        } else {
            format_amount(0)
        },
    }
}

fn item_details(item: &OrderItem) -> Result<OrderItemDetails, OrderError> {
    let line_total = item
        .line_total()
        .ok_or_else(|| OrderError::Validation(format!("item {} amount out of range", item.item_id)))?;

    Ok(OrderItemDetails {
        id: item.item_id.clone(),
        name: item.name.clone(),
        gst_liability: "vendor".to_string(),
        item_tax: item
            .taxes
            .iter()
            .map(|t| ItemTax {
                id: t.id.clone(),
                name: t.title.clone(),
                amount: format_amount(t.amount),
            })
            .collect(),
        item_discount: format_amount(0),
        price: format_amount(item.unit_price),
        final_price: format_amount(line_total),
        quantity: item.quantity.to_string(),
        description: item.description.clone().unwrap_or_default(),
        variation_name: item.variation_name.clone().unwrap_or_default(),
        variation_id: item.variation_id.clone().unwrap_or_default(),
        addons: Details::new(
            item.addons
                .iter()
                .map(|a| AddonDetails {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    group_name: a.group_name.clone(),
                    price: format_amount(a.price),
                    group_id: a.group_id.clone(),
                    quantity: a.quantity.to_string(),
                })
                .collect(),
        ),
    })
}

fn discounts(order: &Order) -> Vec<DiscountDetails> {
    if order.totals.discount_total <= 0 {
        return Vec::new();
    }

    vec![DiscountDetails {
        id: "1".to_string(),
        title: "Discount".to_string(),
        kind: "F".to_string(),
        price: format_amount(order.totals.discount_total),
    }]
}
