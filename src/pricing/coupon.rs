//! Coupon validation
//!
//! Business-rule failures are values, not errors: every path through
//! [`validate_coupon`] produces a [`CouponValidation`] the storefront can show.

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::aggregates::{Cart, Coupon, CouponStatus, Customer};
use crate::domain::value_objects::Money;
use super::quote::{price_lines, PricedLine};
use super::tax::tax_amount;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponRejection {
    #[error("Please enter a coupon code.")]
    MissingCode,
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("Invalid coupon code.")]
    NotFound,
    #[error("This coupon is no longer active.")]
    Inactive,
    #[error("This coupon is not valid yet.")]
    NotStarted,
    #[error("This coupon has expired.")]
    Expired,
    #[error("This coupon requires a subtotal of at least {0}.")]
    BelowMinimum(Money),
    #[error("This coupon does not apply to any items in your cart.")]
    NoEligibleItems,
    #[error("We couldn't validate your coupon right now. Please try again.")]
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<Money>,
}

impl CouponValidation {
    pub fn rejected(reason: CouponRejection) -> Self {
        Self { valid: false, message: Some(reason.to_string()), discount_amount: None, new_total: None }
    }
}

impl From<CouponRejection> for CouponValidation {
    fn from(reason: CouponRejection) -> Self { Self::rejected(reason) }
}

/// Cheap checks that need no lookup. Returns the normalized code.
pub fn precheck(code: &str, cart: &Cart) -> Result<String, CouponRejection> {
    let code = Coupon::normalize_code(code);
    if code.is_empty() { return Err(CouponRejection::MissingCode); }
    if cart.is_empty() { return Err(CouponRejection::EmptyCart); }
    Ok(code)
}

/// Discount a coupon gives on dealer-priced lines at `now`.
pub fn apply_coupon(coupon: &Coupon, lines: &[PricedLine], now: DateTime<Utc>) -> Result<Money, CouponRejection> {
    match coupon.status_at(now) {
        CouponStatus::Usable => {}
        CouponStatus::Inactive => return Err(CouponRejection::Inactive),
        CouponStatus::NotStarted => return Err(CouponRejection::NotStarted),
        CouponStatus::Expired => return Err(CouponRejection::Expired),
    }
    let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
    if let Some(minimum) = coupon.min_subtotal {
        if subtotal < minimum { return Err(CouponRejection::BelowMinimum(minimum)); }
    }
    let eligible: Money = lines.iter().filter(|l| coupon.applies_to(l.product_id)).map(|l| l.line_total).sum();
    if eligible.is_zero() { return Err(CouponRejection::NoEligibleItems); }
    Ok(coupon.discount_on(eligible).min(subtotal))
}

/// Full validation for the storefront's coupon box.
pub fn validate_coupon(
    code: &str,
    coupon: Option<&Coupon>,
    cart: &Cart,
    customer: &Customer,
    destination: Option<&str>,
    now: DateTime<Utc>,
) -> CouponValidation {
    if let Err(reason) = precheck(code, cart) { return reason.into(); }
    let Some(coupon) = coupon else { return CouponRejection::NotFound.into() };

    let lines = price_lines(cart, customer.dealer_discount());
    let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
    let discount = match apply_coupon(coupon, &lines, now) {
        Ok(discount) => discount,
        Err(reason) => return reason.into(),
    };
    let tax = destination.map(|state| tax_amount(subtotal, discount, state)).unwrap_or(Money::ZERO);

    CouponValidation {
        valid: true,
        message: Some(format!("Coupon {} applied: you save {}.", coupon.code, discount)),
        discount_amount: Some(discount),
        new_total: Some(subtotal.saturating_sub(discount) + tax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{CartItem, CouponValueType, Role};
    use crate::domain::value_objects::Percent;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn cart_of(lines: &[(i64, u32, Decimal)]) -> Cart {
        let mut cart = Cart::new();
        for &(product_id, quantity, price) in lines {
            cart.add_item(CartItem { product_id, quantity, unit_price: Money::usd(price) }).unwrap();
        }
        cart
    }

    fn coupon(value_type: CouponValueType, value: Decimal) -> Coupon {
        Coupon {
            id: 1, code: "SAVE20".into(), value, value_type, min_subtotal: None,
            start_date: Some(Utc::now() - Duration::days(10)), end_date: Some(Utc::now() + Duration::days(10)),
            active: true, included_product_ids: vec![], excluded_product_ids: vec![],
        }
    }

    #[test]
    fn test_percent_coupon_with_tax() {
        let cart = cart_of(&[(1, 2, dec!(100.00))]);
        let c = coupon(CouponValueType::Percent, dec!(10));
        let v = validate_coupon("save20", Some(&c), &cart, &Customer::guest(), Some("GA"), Utc::now());
        assert!(v.valid);
        assert_eq!(v.discount_amount.unwrap().amount(), dec!(20.00));
        // 180.00 + 12.60 tax
        assert_eq!(v.new_total.unwrap().amount(), dec!(192.60));
    }

    #[test]
    fn test_fixed_coupon_without_destination_is_untaxed() {
        let cart = cart_of(&[(1, 1, dec!(35.00))]);
        let c = coupon(CouponValueType::Fixed, dec!(50));
        let v = validate_coupon("SAVE20", Some(&c), &cart, &Customer::guest(), None, Utc::now());
        assert!(v.valid);
        assert_eq!(v.discount_amount.unwrap().amount(), dec!(35.00));
        assert!(v.new_total.unwrap().is_zero());
    }

    #[test]
    fn test_expired_coupon_never_validates() {
        let now = Utc::now();
        let mut c = coupon(CouponValueType::Percent, dec!(50));
        c.end_date = Some(now - Duration::seconds(1));
        let carts = [
            cart_of(&[(1, 1, dec!(10))]),
            cart_of(&[(1, 5, dec!(999.99)), (2, 1, dec!(0.01))]),
            cart_of(&[(3, 99, dec!(1))]),
        ];
        let dealer = Customer { id: Some(1), role: Role::Dealer, dealer_tier: Some(4), dealer_discount: Some(Percent::from_whole(30)) };
        for cart in &carts {
            for customer in [&Customer::guest(), &dealer] {
                let v = validate_coupon("SAVE20", Some(&c), cart, customer, Some("GA"), now);
                assert!(!v.valid);
                assert_eq!(v.message.as_deref(), Some("This coupon has expired."));
                assert!(v.discount_amount.is_none());
            }
        }
    }

    #[test]
    fn test_structured_rejections() {
        let cart = cart_of(&[(1, 1, dec!(10))]);
        let c = coupon(CouponValueType::Percent, dec!(10));
        let now = Utc::now();
        assert_eq!(validate_coupon("  ", Some(&c), &cart, &Customer::guest(), None, now), CouponValidation::rejected(CouponRejection::MissingCode));
        assert_eq!(validate_coupon("SAVE20", Some(&c), &Cart::new(), &Customer::guest(), None, now), CouponValidation::rejected(CouponRejection::EmptyCart));
        assert_eq!(validate_coupon("NOPE", None, &cart, &Customer::guest(), None, now), CouponValidation::rejected(CouponRejection::NotFound));

        let mut min = c.clone();
        min.min_subtotal = Some(Money::usd(dec!(75)));
        let v = validate_coupon("SAVE20", Some(&min), &cart, &Customer::guest(), None, now);
        assert_eq!(v.message.as_deref(), Some("This coupon requires a subtotal of at least $75.00."));

        let mut only_other = c.clone();
        only_other.included_product_ids = vec![42];
        assert_eq!(validate_coupon("SAVE20", Some(&only_other), &cart, &Customer::guest(), None, now), CouponValidation::rejected(CouponRejection::NoEligibleItems));
    }

    #[test]
    fn test_coupon_applies_after_dealer_discount() {
        let cart = cart_of(&[(1, 1, dec!(200.00))]);
        let c = coupon(CouponValueType::Percent, dec!(10));
        let dealer = Customer { id: Some(9), role: Role::Dealer, dealer_tier: Some(2), dealer_discount: Some(Percent::from_whole(5)) };
        let v = validate_coupon("SAVE20", Some(&c), &cart, &dealer, Some("FL"), Utc::now());
        // 200 less 10% dealer = 180, less 10% coupon = 162
        assert_eq!(v.discount_amount.unwrap().amount(), dec!(18.00));
        assert_eq!(v.new_total.unwrap().amount(), dec!(162.00));
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let json = serde_json::to_value(CouponValidation::rejected(CouponRejection::NotFound)).unwrap();
        assert_eq!(json, serde_json::json!({"valid": false, "message": "Invalid coupon code."}));
    }
}
