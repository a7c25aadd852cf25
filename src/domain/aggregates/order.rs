//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Money;
use crate::pricing::Quote;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem { pub product_id: i64, pub part_number: String, pub name: String, pub quantity: u32, pub unit_price: Money, pub total: Money }

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address { pub name: String, pub street1: String, pub street2: Option<String>, pub city: String, pub state: String, pub zip: String, pub phone: Option<String> }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { Pending, AwaitingPayment }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "pending", Self::AwaitingPayment => "awaiting_payment" }
    }
}

/// How the order is paid. Card tokens are only ever held encrypted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payment {
    Card { token_ciphertext: String },
    PayPal { paypal_order_id: String },
}

impl Payment {
    pub fn method(&self) -> &'static str {
        match self { Self::Card { .. } => "card", Self::PayPal { .. } => "paypal" }
    }
}

#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    order_number: String,
    customer_id: Option<i64>,
    email: String,
    status: OrderStatus,
    items: Vec<LineItem>,
    quote: Quote,
    shipping_address: Option<Address>,
    payment: Payment,
    created_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Order {
    pub fn place(
        customer_id: Option<i64>,
        email: impl Into<String>,
        items: Vec<LineItem>,
        quote: Quote,
        shipping_address: Option<Address>,
        payment: Payment,
    ) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        if quote.shipping_method != crate::pricing::ShippingMethod::Pickup && shipping_address.is_none() {
            return Err(OrderError::MissingShippingAddress);
        }
        let status = match payment {
            Payment::Card { .. } => OrderStatus::Pending,
            Payment::PayPal { .. } => OrderStatus::AwaitingPayment,
        };
        let mut order = Self {
            id: Uuid::now_v7(),
            order_number: format!("PL-{:08}", rand::random::<u32>() % 100_000_000),
            customer_id, email: email.into(), status, items, quote, shipping_address, payment,
            created_at: Utc::now(), events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id,
            total: order.quote.total.amount(),
            coupon_code: order.quote.coupon_code.clone(),
        }));
        Ok(order)
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn customer_id(&self) -> Option<i64> { self.customer_id }
    pub fn email(&self) -> &str { &self.email }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn quote(&self) -> &Quote { &self.quote }
    pub fn total(&self) -> Money { self.quote.total }
    pub fn shipping_address(&self) -> Option<&Address> { self.shipping_address.as_ref() }
    pub fn payment(&self) -> &Payment { &self.payment }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("An order needs at least one item")]
    NoItems,
    #[error("A shipping address is required")]
    MissingShippingAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Cart, CartItem, Customer};
    use crate::pricing::{quote, QuoteRequest, ShippingMethod, ShippingRates};
    use rust_decimal_macros::dec;

    fn sample_quote(method: ShippingMethod) -> Quote {
        let mut cart = Cart::new();
        cart.add_item(CartItem { product_id: 1, quantity: 2, unit_price: Money::usd(dec!(10)) }).unwrap();
        let rates = ShippingRates { ground: Money::usd(dec!(15)), freight: Money::usd(dec!(150)) };
        quote(QuoteRequest {
            cart: &cart, customer: &Customer::guest(), coupon: None, destination: Some("GA"),
            shipping_method: method, rates: &rates, now: Utc::now(),
        }).unwrap()
    }

    fn items() -> Vec<LineItem> {
        vec![LineItem { product_id: 1, part_number: "SB-01".into(), name: "Sway Bar".into(), quantity: 2, unit_price: Money::usd(dec!(10)), total: Money::usd(dec!(20)) }]
    }

    #[test]
    fn test_place_order_raises_event() {
        let address = Address { name: "A Buyer".into(), street1: "1 Main St".into(), city: "Atlanta".into(), state: "GA".into(), zip: "30301".into(), ..Default::default() };
        let mut order = Order::place(Some(3), "buyer@example.com", items(), sample_quote(ShippingMethod::Ground), Some(address),
            Payment::PayPal { paypal_order_id: "5O190127TN364715T".into() }).unwrap();
        assert_eq!(order.status(), OrderStatus::AwaitingPayment);
        assert!(order.order_number().starts_with("PL-"));
        // 20.00 + 1.40 tax + 15.00 ground
        assert_eq!(order.total().amount(), dec!(36.40));
        let events = order.take_events();
        assert_eq!(events.len(), 1);
        assert!(order.take_events().is_empty());
    }

    #[test]
    fn test_place_order_requires_items_and_address() {
        let q = sample_quote(ShippingMethod::Ground);
        let card = Payment::Card { token_ciphertext: "c".into() };
        assert_eq!(Order::place(None, "x@example.com", vec![], q.clone(), None, card.clone()).unwrap_err(), OrderError::NoItems);
        assert_eq!(Order::place(None, "x@example.com", items(), q, None, card.clone()).unwrap_err(), OrderError::MissingShippingAddress);
        let pickup = Order::place(None, "x@example.com", items(), sample_quote(ShippingMethod::Pickup), None, card).unwrap();
        assert_eq!(pickup.status(), OrderStatus::Pending);
        assert!(pickup.quote().tax.is_zero());
        assert!(pickup.shipping_address().is_none());
    }
}
