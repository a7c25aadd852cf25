//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", rename_all = "snake_case")]
pub enum DomainEvent {
    Order(OrderEvent),
    Coupon(CouponEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, customer_id: Option<i64>, total: Decimal, coupon_code: Option<String> },
    PaymentTokenRevealed { order_id: Uuid, admin_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponEvent {
    Created { code: String },
    ExpiredDeactivated { count: u64 },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(OrderEvent::Placed { .. }) => "storefront.order.placed",
            Self::Order(OrderEvent::PaymentTokenRevealed { .. }) => "storefront.order.payment_token_revealed",
            Self::Coupon(CouponEvent::Created { .. }) => "storefront.coupon.created",
            Self::Coupon(CouponEvent::ExpiredDeactivated { .. }) => "storefront.coupon.expired_deactivated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_shape() {
        let e = DomainEvent::Coupon(CouponEvent::ExpiredDeactivated { count: 3 });
        assert_eq!(e.subject(), "storefront.coupon.expired_deactivated");
        assert_eq!(serde_json::to_value(&e).unwrap(), serde_json::json!({"aggregate": "coupon", "type": "expired_deactivated", "count": 3}));
    }
}
