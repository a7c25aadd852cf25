//! Pricing rules: dealer discounts, coupons, sales tax and shipping.
//!
//! Everything here is a pure function of its inputs; callers load the rows.

pub mod coupon;
pub mod dealer;
pub mod quote;
pub mod shipping;
pub mod tax;

pub use coupon::{validate_coupon, CouponRejection, CouponValidation};
pub use dealer::{effective_dealer_discount, tier_default_discount};
pub use quote::{quote, PricedLine, Quote, QuoteError, QuoteRequest};
pub use shipping::{is_lower_48_us_state, ShippingError, ShippingMethod, ShippingRates};
pub use tax::{tax_amount, tax_rate};
