//! `POST /api/v1/validate-coupon`
//!
//! Always answers 200 with a [`CouponValidation`]. Malformed bodies, bad cart
//! lines and database failures all become `valid: false`.

use axum::{extract::{rejection::JsonRejection, State}, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use crate::domain::aggregates::{Cart, CartError, CartItem, Customer};
use crate::domain::value_objects::Money;
use crate::pricing::coupon::{precheck, validate_coupon as resolve, CouponRejection, CouponValidation};
use super::{session::{MaybeSession, Session}, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<CouponCartItem>,
    pub customer_id: Option<i64>,
    pub shipping_address: Option<CouponAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCartItem { pub product_id: i64, pub price: Decimal, pub quantity: u32 }

#[derive(Debug, Deserialize)]
pub struct CouponAddress { pub state: Option<String> }

impl ValidateCouponRequest {
    fn cart(&self) -> Result<Cart, CartError> {
        let mut cart = Cart::new();
        for item in &self.cart_items {
            cart.add_item(CartItem { product_id: item.product_id, quantity: item.quantity, unit_price: Money::usd(item.price) })?;
        }
        Ok(cart)
    }

    fn destination(&self) -> Option<&str> {
        self.shipping_address.as_ref().and_then(|a| a.state.as_deref()).filter(|s| !s.trim().is_empty())
    }
}

/// Who the coupon is priced for. Dealer pricing needs a session; the stored
/// customer row wins over the dealer fields carried in the token.
fn pricing_customer(session: Option<&Session>, stored: Option<Customer>) -> Customer {
    match session {
        Some(session) => stored.unwrap_or_else(|| session.customer()),
        None => Customer::guest(),
    }
}

fn invalid(message: impl Into<String>) -> Json<CouponValidation> {
    Json(CouponValidation { valid: false, message: Some(message.into()), discount_amount: None, new_total: None })
}

pub async fn validate_coupon(
    State(s): State<AppState>,
    session: MaybeSession,
    payload: Result<Json<ValidateCouponRequest>, JsonRejection>,
) -> Json<CouponValidation> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable coupon request");
            return invalid("Invalid request.");
        }
    };
    let cart = match req.cart() {
        Ok(cart) => cart,
        Err(e) => return invalid(e.to_string()),
    };
    let code = match precheck(req.coupon_code.as_deref().unwrap_or_default(), &cart) {
        Ok(code) => code,
        Err(reason) => return Json(reason.into()),
    };

    if session.0.is_none() {
        if let Some(id) = req.customer_id {
            tracing::debug!(customer_id = id, "customerId without a session, pricing as guest");
        }
    }
    let lookup = async {
        let stored = match &session.0 {
            Some(session) => s.store.find_customer(session.customer_id()).await?,
            None => None,
        };
        let customer = pricing_customer(session.0.as_ref(), stored);
        let coupon = s.store.find_coupon(&code).await?;
        crate::Result::Ok((customer, coupon))
    };
    let (customer, coupon) = match lookup.await {
        Ok(found) => found,
        Err(e) => {
            tracing::error!(error = %e, code = %code, "coupon validation lookup failed");
            return Json(CouponRejection::Unavailable.into());
        }
    };

    let result = resolve(&code, coupon.as_ref(), &cart, &customer, req.destination(), Utc::now());
    tracing::info!(code = %code, valid = result.valid, customer = ?customer.id, "coupon validated");
    Json(result)
}
