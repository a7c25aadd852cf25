//! Aggregates module
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod customer;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartItem, MAX_LINE_QUANTITY};
pub use catalog::{Category, MainCategory, Platform};
pub use coupon::{Coupon, CouponError, CouponStatus, CouponValueType};
pub use customer::{Customer, Role};
pub use order::{Address, LineItem, Order, OrderError, OrderStatus, Payment};
pub use product::{Product, ProductError};
