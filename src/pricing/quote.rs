//! Full checkout pricing: dealer prices, coupon, tax and shipping

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::aggregates::{Cart, Coupon, Customer};
use crate::domain::value_objects::{Money, Percent};
use super::coupon::{apply_coupon, CouponRejection};
use super::shipping::{ShippingError, ShippingMethod, ShippingRates};
use super::tax::tax_amount;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: u32,
    pub list_price: Money,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Applies the dealer discount to every unit price.
pub fn price_lines(cart: &Cart, dealer_discount: Percent) -> Vec<PricedLine> {
    cart.items().iter().map(|item| {
        let unit_price = if dealer_discount.is_zero() { item.unit_price } else { item.unit_price.less_percent(dealer_discount) };
        PricedLine {
            product_id: item.product_id,
            quantity: item.quantity,
            list_price: item.unit_price,
            unit_price,
            line_total: unit_price.multiply(item.quantity),
        }
    }).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub list_subtotal: Money,
    pub dealer_discount_rate: Percent,
    pub dealer_discount: Money,
    /// After dealer pricing, before the coupon.
    pub subtotal: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub coupon_discount: Money,
    pub tax: Money,
    pub shipping_method: ShippingMethod,
    pub shipping: Money,
    pub total: Money,
}

pub struct QuoteRequest<'a> {
    pub cart: &'a Cart,
    pub customer: &'a Customer,
    pub coupon: Option<&'a Coupon>,
    pub destination: Option<&'a str>,
    pub shipping_method: ShippingMethod,
    pub rates: &'a ShippingRates,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("{0}")]
    Coupon(#[from] CouponRejection),
    #[error("{0}")]
    Shipping(#[from] ShippingError),
}

pub fn quote(req: QuoteRequest<'_>) -> Result<Quote, QuoteError> {
    if req.cart.is_empty() { return Err(QuoteError::EmptyCart); }
    let state = req.shipping_method.check_destination(req.destination)?;

    let dealer_discount_rate = req.customer.dealer_discount();
    let lines = price_lines(req.cart, dealer_discount_rate);
    let list_subtotal = req.cart.subtotal();
    let subtotal: Money = lines.iter().map(|l| l.line_total).sum();

    let coupon_discount = match req.coupon {
        Some(coupon) => apply_coupon(coupon, &lines, req.now)?,
        None => Money::ZERO,
    };
    // Pickup orders are taxed at the store's own rate.
    let tax_state = state.map(|s| s.code()).unwrap_or(super::tax::TAX_EXEMPT_STATE);
    let tax = tax_amount(subtotal, coupon_discount, tax_state);
    let shipping = req.shipping_method.charge(req.rates);

    Ok(Quote {
        lines,
        list_subtotal,
        dealer_discount_rate,
        dealer_discount: list_subtotal.saturating_sub(subtotal),
        subtotal,
        coupon_code: req.coupon.map(|c| c.code.clone()),
        coupon_discount,
        tax,
        shipping_method: req.shipping_method,
        shipping,
        total: subtotal.saturating_sub(coupon_discount) + tax + shipping,
    })
}
