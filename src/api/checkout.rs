//! Checkout: server-side quotes and order placement

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::{Address, Cart, CartItem, Coupon, Customer, LineItem, Order, OrderStatus, Payment, Product};
use crate::pricing::{self, CouponRejection, Quote, QuoteRequest, ShippingMethod};
use crate::EcommerceError;
use super::{error::ApiError, session::MaybeSession, AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 50, message = "between 1 and 50 cart lines are required"))]
    pub items: Vec<CheckoutItem>,
    #[validate(length(max = 32))]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    #[validate]
    pub shipping_address: Option<AddressInput>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem { pub product_id: i64, pub quantity: u32 }

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub street1: String,
    pub street2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 2, max = 40))]
    pub state: String,
    #[validate(length(min = 5, max = 10))]
    pub zip: String,
    pub phone: Option<String>,
}

impl From<&AddressInput> for Address {
    fn from(a: &AddressInput) -> Self {
        Address {
            name: a.name.trim().to_string(), street1: a.street1.trim().to_string(), street2: a.street2.clone(),
            city: a.city.trim().to_string(), state: a.state.trim().to_string(), zip: a.zip.trim().to_string(), phone: a.phone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentInput {
    Card { token: String },
    #[serde(rename_all = "camelCase")]
    Paypal { paypal_order_id: String },
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    #[validate]
    pub checkout: CheckoutRequest,
    #[validate(email)]
    pub email: String,
    pub payment: PaymentInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub quote: Quote,
}

/// Prices the request from catalog prices. Client prices are never trusted here.
async fn price_checkout(s: &AppState, customer: &Customer, req: &CheckoutRequest) -> Result<(Quote, Vec<LineItem>), ApiError> {
    let ids: Vec<i64> = req.items.iter().map(|i| i.product_id).collect();
    let products: HashMap<i64, Product> = s.store.products_by_ids(&ids).await?.into_iter().map(|p| (p.id, p)).collect();

    let mut cart = Cart::new();
    for item in &req.items {
        let product = products.get(&item.product_id).ok_or(EcommerceError::ProductNotFound(item.product_id))?;
        product.ensure_purchasable()?;
        cart.add_item(CartItem { product_id: product.id, quantity: item.quantity, unit_price: product.price })?;
    }

    let coupon = match req.coupon_code.as_deref().map(Coupon::normalize_code).filter(|c| !c.is_empty()) {
        Some(code) => Some(s.store.find_coupon(&code).await?.ok_or_else(|| ApiError::Validation(CouponRejection::NotFound.to_string()))?),
        None => None,
    };

    let quote = pricing::quote(QuoteRequest {
        cart: &cart,
        customer,
        coupon: coupon.as_ref(),
        destination: req.shipping_address.as_ref().map(|a| a.state.as_str()),
        shipping_method: req.shipping_method,
        rates: &s.shipping_rates,
        now: Utc::now(),
    })?;

    let items = quote.lines.iter().map(|line| {
        let product = &products[&line.product_id];
        LineItem {
            product_id: line.product_id, part_number: product.part_number.clone(), name: product.name.clone(),
            quantity: line.quantity, unit_price: line.unit_price, total: line.line_total,
        }
    }).collect();
    Ok((quote, items))
}

fn customer_for(session: &MaybeSession) -> Customer {
    session.0.as_ref().map(|s| s.customer()).unwrap_or_default()
}

pub async fn quote(State(s): State<AppState>, session: MaybeSession, Json(req): Json<CheckoutRequest>) -> Result<Json<Quote>, ApiError> {
    req.validate()?;
    let (quote, _) = price_checkout(&s, &customer_for(&session), &req).await?;
    Ok(Json(quote))
}

pub async fn place_order(
    State(s): State<AppState>,
    session: MaybeSession,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    req.validate()?;
    let customer = customer_for(&session);
    let (quote, items) = price_checkout(&s, &customer, &req.checkout).await?;

    let payment = match &req.payment {
        PaymentInput::Card { token } if !token.trim().is_empty() => Payment::Card { token_ciphertext: s.cipher.encrypt(token.trim()).map_err(EcommerceError::from)? },
        PaymentInput::Paypal { paypal_order_id } if !paypal_order_id.trim().is_empty() => {
            Payment::PayPal { paypal_order_id: paypal_order_id.trim().to_string() }
        }
        _ => return Err(ApiError::Validation("A payment token or PayPal order id is required".to_string())),
    };

    let address = req.checkout.shipping_address.as_ref().map(Address::from);
    let mut order = Order::place(customer.id, req.email.trim(), items, quote, address, payment)?;
    s.store.insert_order(&order).await?;
    tracing::info!(
        order_id = %order.id(), order_number = order.order_number(), total = %order.total(),
        payment = order.payment().method(), customer = ?order.customer_id(), "order placed"
    );
    s.publish(order.take_events()).await;

    Ok((StatusCode::CREATED, Json(OrderResponse {
        id: order.id(),
        order_number: order.order_number().to_string(),
        status: order.status(),
        quote: order.quote().clone(),
    })))
}
