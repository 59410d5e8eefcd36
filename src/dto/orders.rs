use serde::{Deserialize, Serialize};

use crate::models::{OrderLine, ShippingAddress};

/// Payload for `POST /orders` and `POST /orders/guest`.
///
/// `items_total` and `tax_price` come out of the inclusive-tax decomposition
/// and are fractional; the grand total stays in whole minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_total: f64,
    pub shipping_price: i64,
    pub tax_price: f64,
    pub total_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
}

/// One offending line of a structured stock-conflict rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConflictLine {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub total_revenue: i64,
    #[serde(default)]
    pub pending_orders: i64,
}
