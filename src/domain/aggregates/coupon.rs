//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::domain::value_objects::{Money, Percent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponValueType {
    Percent,
    Fixed,
}

impl CouponValueType {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Percent => "percent", Self::Fixed => "fixed" }
    }
}

impl FromStr for CouponValueType {
    type Err = CouponError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" | "percentage" => Ok(Self::Percent),
            "fixed" | "amount" => Ok(Self::Fixed),
            other => Err(CouponError::UnknownValueType(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub value: Decimal,
    pub value_type: CouponValueType,
    pub min_subtotal: Option<Money>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
    /// Empty means every product is eligible.
    pub included_product_ids: Vec<i64>,
    pub excluded_product_ids: Vec<i64>,
}

/// Why a coupon cannot be used right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouponStatus {
    Usable,
    Inactive,
    NotStarted,
    Expired,
}

impl Coupon {
    /// Codes are compared trimmed and upper-cased.
    pub fn normalize_code(code: &str) -> String { code.trim().to_uppercase() }

    pub fn status_at(&self, now: DateTime<Utc>) -> CouponStatus {
        if !self.active { return CouponStatus::Inactive; }
        if self.start_date.is_some_and(|start| now < start) { return CouponStatus::NotStarted; }
        if self.is_expired_at(now) { return CouponStatus::Expired; }
        CouponStatus::Usable
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.end_date.is_some_and(|end| end < now) }

    pub fn applies_to(&self, product_id: i64) -> bool {
        if self.excluded_product_ids.contains(&product_id) { return false; }
        self.included_product_ids.is_empty() || self.included_product_ids.contains(&product_id)
    }

    /// Discount on the eligible part of a cart, never more than that amount.
    pub fn discount_on(&self, eligible: Money) -> Money {
        let discount = match self.value_type {
            CouponValueType::Percent => eligible.percent_of(Percent::clamped(self.value)),
            CouponValueType::Fixed => Money::usd(self.value).round_cents(),
        };
        discount.min(eligible).max(Money::ZERO)
    }

    /// Checks the invariants an admin-created coupon must satisfy.
    pub fn check(&self) -> Result<(), CouponError> {
        if Self::normalize_code(&self.code).is_empty() { return Err(CouponError::EmptyCode); }
        if self.value <= Decimal::ZERO { return Err(CouponError::NonPositiveValue); }
        if self.value_type == CouponValueType::Percent && self.value > Decimal::ONE_HUNDRED {
            return Err(CouponError::PercentOverHundred);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end <= start { return Err(CouponError::EndsBeforeStart); }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    #[error("unknown coupon value type: {0}")]
    UnknownValueType(String),
    #[error("coupon code cannot be empty")]
    EmptyCode,
    #[error("coupon value must be positive")]
    NonPositiveValue,
    #[error("percentage coupons cannot exceed 100%")]
    PercentOverHundred,
    #[error("coupon end date must be after its start date")]
    EndsBeforeStart,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(value_type: CouponValueType, value: Decimal) -> Coupon {
        Coupon {
            id: 1, code: "SPRING10".into(), value, value_type, min_subtotal: None,
            start_date: None, end_date: None, active: true,
            included_product_ids: vec![], excluded_product_ids: vec![],
        }
    }

    #[test]
    fn test_status_window() {
        let now = Utc::now();
        let mut c = coupon(CouponValueType::Percent, dec!(10));
        assert_eq!(c.status_at(now), CouponStatus::Usable);
        c.end_date = Some(now - Duration::days(1));
        assert_eq!(c.status_at(now), CouponStatus::Expired);
        c.end_date = Some(now + Duration::days(1));
        c.start_date = Some(now + Duration::hours(1));
        assert_eq!(c.status_at(now), CouponStatus::NotStarted);
        c.start_date = None;
        c.active = false;
        assert_eq!(c.status_at(now), CouponStatus::Inactive);
    }

    #[test]
    fn test_discount_types() {
        let pct = coupon(CouponValueType::Percent, dec!(15));
        assert_eq!(pct.discount_on(Money::usd(dec!(199.99))).amount(), dec!(30.00));
        let fixed = coupon(CouponValueType::Fixed, dec!(50));
        assert_eq!(fixed.discount_on(Money::usd(dec!(30))).amount(), dec!(30));
        assert_eq!(fixed.discount_on(Money::usd(dec!(80))).amount(), dec!(50));
    }

    #[test]
    fn test_inclusion_and_exclusion() {
        let mut c = coupon(CouponValueType::Percent, dec!(10));
        c.excluded_product_ids = vec![9];
        assert!(c.applies_to(1));
        assert!(!c.applies_to(9));
        c.included_product_ids = vec![1, 9];
        assert!(c.applies_to(1));
        assert!(!c.applies_to(2));
        assert!(!c.applies_to(9));
    }

    #[test]
    fn test_check_rejects_bad_coupons() {
        assert_eq!(coupon(CouponValueType::Percent, dec!(120)).check(), Err(CouponError::PercentOverHundred));
        assert_eq!(coupon(CouponValueType::Fixed, dec!(0)).check(), Err(CouponError::NonPositiveValue));
        let mut c = coupon(CouponValueType::Fixed, dec!(5));
        c.code = "  ".into();
        assert_eq!(c.check(), Err(CouponError::EmptyCode));
        assert_eq!("Percentage".parse::<CouponValueType>(), Ok(CouponValueType::Percent));
    }
}
