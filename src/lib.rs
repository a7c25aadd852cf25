//! Partsline Storefront
//!
//! Back end for an aftermarket suspension and chassis parts store. Parts are
//! keyed to vehicle platforms (make/model over a year range).
//!
//! ## Features
//! - Vehicle fitment: platform → categories → products
//! - Dealer pricing by tier, with per-customer overrides
//! - Coupon validation (percent or fixed, product inclusion/exclusion)
//! - Sales tax and lower-48 shipping rules
//! - Checkout quotes and order placement (card token or PayPal)
//! - Admin coupon maintenance and audited payment-token access

use thiserror::Error;

pub mod api;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod fitment;
pub mod pricing;
pub mod store;

pub use config::Config;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EcommerceError {
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Platform '{0}' not found")]
    PlatformNotFound(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Order has no card token on file")]
    NoPaymentToken,

    #[error("Coupon {0} already exists")]
    DuplicateCoupon(String),

    #[error("Corrupt {table} row {id}: {reason}")]
    CorruptRow { table: &'static str, id: String, reason: String },

    #[error("Storage error: {0}")]
    StorageError(#[from] sqlx::Error),

    #[error(transparent)]
    Crypto(#[from] crypto::CryptoError),
}

pub type Result<T> = std::result::Result<T, EcommerceError>;
