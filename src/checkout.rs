//! Checkout math and order placement.
//!
//! Cart prices are tax inclusive; for display and for the order payload they
//! are decomposed into a base price and the tax folded into it. This is a
//! pure function of the cart snapshot and is recomputed whenever the cart
//! changes.

use uuid::Uuid;

use crate::api::OrdersApi;
use crate::dto::orders::CreateOrderRequest;
use crate::error::CheckoutError;
use crate::models::{Cart, Order, OrderLine, ShippingAddress};
use crate::notify::Notifier;
use crate::stores::{CartStore, SessionStore};

/// Unit price (minor units) above which the higher tax slab applies.
pub const TAX_SLAB_THRESHOLD: i64 = 2500;
pub const TAX_RATE_HIGH: f64 = 0.18;
pub const TAX_RATE_LOW: f64 = 0.05;

/// Orders at or above this total ship free; below it a flat fee applies.
pub const FREE_SHIPPING_THRESHOLD: i64 = 2999;
pub const FLAT_SHIPPING_PRICE: i64 = 199;

pub fn tax_rate(unit_price: i64) -> f64 {
    if unit_price > TAX_SLAB_THRESHOLD {
        TAX_RATE_HIGH
    } else {
        TAX_RATE_LOW
    }
}

pub fn shipping_price(total_amount: i64) -> i64 {
    if total_amount >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_PRICE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxLine {
    pub item_id: Uuid,
    pub base_price: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxBreakdown {
    pub lines: Vec<TaxLine>,
    pub subtotal: f64,
    pub tax: f64,
}

/// Splits each line's gross amount into base price and included tax. The
/// grand total is untouched: `subtotal + tax` equals the sum of gross line
/// amounts to within floating-point error.
pub fn decompose(cart: &Cart) -> TaxBreakdown {
    let mut breakdown = TaxBreakdown::default();
    for item in &cart.items {
        let gross = item.line_total() as f64;
        let rate = tax_rate(item.price);
        let base_price = gross / (1.0 + rate);
        let tax = gross - base_price;
        breakdown.subtotal += base_price;
        breakdown.tax += tax;
        breakdown.lines.push(TaxLine {
            item_id: item.id,
            base_price,
            tax,
        });
    }
    breakdown
}

#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    /// Required when placing an order without a session.
    pub guest_email: Option<String>,
}

pub fn build_order_request(cart: &Cart, details: &OrderDetails) -> CreateOrderRequest {
    let breakdown = decompose(cart);
    let shipping = shipping_price(cart.total_amount);
    CreateOrderRequest {
        items: cart
            .items
            .iter()
            .map(|item| OrderLine {
                product: item.product.id,
                name: item.product.name.clone(),
                image: item.product.images.first().cloned(),
                quantity: item.quantity,
                size: item.size.clone(),
                color: item.color.clone(),
                price: item.price,
            })
            .collect(),
        shipping_address: details.shipping_address.clone(),
        payment_method: details.payment_method.clone(),
        items_total: breakdown.subtotal,
        shipping_price: shipping,
        tax_price: breakdown.tax,
        total_amount: cart.total_amount + shipping,
        guest_email: details.guest_email.clone(),
    }
}

/// Places an order from the current cart snapshot. On success the cart is
/// cleared. A structured stock-conflict rejection is returned as
/// `CheckoutError::StockConflict` so the caller can route the user back to
/// the cart; it is never retried here.
pub async fn place_order(
    orders: &dyn OrdersApi,
    session: &SessionStore,
    cart: &CartStore,
    notifier: &dyn Notifier,
    details: &OrderDetails,
) -> Result<Order, CheckoutError> {
    let snapshot = cart.cart();
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let request = build_order_request(&snapshot, details);

    let result = if session.is_authenticated() {
        orders.create_order(&request).await
    } else {
        if details.guest_email.is_none() {
            return Err(CheckoutError::MissingGuestEmail);
        }
        orders.create_guest_order(&request).await
    };

    match result {
        Ok(order) => {
            cart.clear_cart().await;
            notifier.success("Order placed successfully!");
            Ok(order)
        }
        Err(err) => {
            if let Some(conflicts) = err.stock_conflicts() {
                return Err(CheckoutError::StockConflict(conflicts.to_vec()));
            }
            tracing::error!(error = %err, "order placement failed");
            notifier.error("Failed to place order");
            Err(CheckoutError::Api(err))
        }
    }
}
