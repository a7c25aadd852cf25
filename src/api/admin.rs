//! Admin endpoints. Every handler requires an admin session.

use axum::{extract::{Path, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::{Coupon, CouponValueType, Product};
use crate::domain::events::{CouponEvent, DomainEvent, OrderEvent};
use crate::domain::value_objects::{CategoryIds, Money};
use crate::EcommerceError;
use super::{error::ApiError, session::AdminSession, AppState};

pub async fn list_coupons(State(s): State<AppState>, _admin: AdminSession) -> Result<Json<Vec<Coupon>>, ApiError> {
    Ok(Json(s.store.list_coupons().await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    pub value: Decimal,
    pub value_type: CouponValueType,
    pub min_subtotal: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub included_product_ids: Vec<i64>,
    #[serde(default)]
    pub excluded_product_ids: Vec<i64>,
}

impl From<CreateCouponRequest> for Coupon {
    fn from(r: CreateCouponRequest) -> Self {
        Coupon {
            id: 0, code: Coupon::normalize_code(&r.code), value: r.value, value_type: r.value_type,
            min_subtotal: r.min_subtotal.map(Money::usd), start_date: r.start_date, end_date: r.end_date, active: true,
            included_product_ids: r.included_product_ids, excluded_product_ids: r.excluded_product_ids,
        }
    }
}

pub async fn create_coupon(
    State(s): State<AppState>,
    AdminSession(admin): AdminSession,
    Json(req): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    req.validate()?;
    let coupon = Coupon::from(req);
    coupon.check()?;
    let stored = s.store.insert_coupon(&coupon).await?;
    tracing::info!(code = %stored.code, admin = admin.customer_id(), "coupon created");
    s.publish(vec![DomainEvent::Coupon(CouponEvent::Created { code: stored.code.clone() })]).await;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Serialize)]
pub struct DeactivatedResponse { pub deactivated: u64 }

pub async fn deactivate_expired_coupons(State(s): State<AppState>, AdminSession(admin): AdminSession) -> Result<Json<DeactivatedResponse>, ApiError> {
    let count = s.store.deactivate_expired_coupons(Utc::now()).await?;
    tracing::info!(count, admin = admin.customer_id(), "deactivated expired coupons");
    if count > 0 {
        s.publish(vec![DomainEvent::Coupon(CouponEvent::ExpiredDeactivated { count })]).await;
    }
    Ok(Json(DeactivatedResponse { deactivated: count }))
}

/// A product row from a legacy catalog export. `catId` is the old comma-delimited category list.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProductRow {
    #[validate(length(min = 1, max = 64))]
    pub part_number: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub price: Decimal,
    pub platform_id: Option<i64>,
    #[serde(default = "shown")]
    pub display: bool,
    #[serde(default)]
    pub cat_id: String,
}

fn shown() -> bool { true }

impl From<LegacyProductRow> for Product {
    fn from(r: LegacyProductRow) -> Self {
        Product {
            id: 0, part_number: r.part_number.trim().to_string(), name: r.name.trim().to_string(), price: Money::usd(r.price),
            platform_id: r.platform_id, category_ids: CategoryIds::parse(&r.cat_id), display: r.display,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ImportProductsRequest {
    #[validate(length(min = 1, max = 500, message = "between 1 and 500 products per import"))]
    pub products: Vec<LegacyProductRow>,
}

#[derive(Debug, Serialize)]
pub struct ImportedResponse { pub imported: u64 }

pub async fn import_products(
    State(s): State<AppState>,
    AdminSession(admin): AdminSession,
    Json(req): Json<ImportProductsRequest>,
) -> Result<Json<ImportedResponse>, ApiError> {
    req.validate()?;
    let mut products = Vec::with_capacity(req.products.len());
    for row in req.products {
        row.validate()?;
        if row.price.is_sign_negative() && !row.price.is_zero() {
            return Err(ApiError::Validation(format!("{}: price cannot be negative", row.part_number)));
        }
        products.push(Product::from(row));
    }
    let imported = s.store.import_products(&products).await?;
    tracing::info!(imported, admin = admin.customer_id(), "legacy products imported");
    Ok(Json(ImportedResponse { imported }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTokenResponse { pub order_id: Uuid, pub token: String }

/// Decrypts an order's card token. The access is recorded before the token is returned.
pub async fn reveal_payment_token(
    State(s): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(order_id): Path<Uuid>,
) -> Result<Json<PaymentTokenResponse>, ApiError> {
    let ciphertext = s.store.payment_token_ciphertext(order_id).await?;
    let token = s.cipher.decrypt(&ciphertext).map_err(EcommerceError::from)?;
    s.store.log_payment_token_access(order_id, admin.customer_id()).await?;
    tracing::info!(target: "audit", %order_id, admin = admin.customer_id(), "payment token decrypted");
    s.publish(vec![DomainEvent::Order(OrderEvent::PaymentTokenRevealed { order_id, admin_id: admin.customer_id() })]).await;
    Ok(Json(PaymentTokenResponse { order_id, token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_legacy_row_category_list_becomes_a_set() {
        let row: LegacyProductRow = serde_json::from_value(serde_json::json!({
            "partNumber": " SW-S197 ", "name": "Sway Bar", "price": 349.5, "platformId": 3, "catId": "3,7, 12,"
        })).unwrap();
        let product = Product::from(row);
        assert_eq!(product.part_number, "SW-S197");
        assert_eq!(product.price.amount(), dec!(349.5));
        assert!(product.display);
        assert_eq!(product.category_ids.to_string(), "3,7,12");
        assert!(product.is_in_category(12));
        assert!(!product.is_in_category(1));
    }

    #[test]
    fn test_legacy_row_without_categories() {
        let row: LegacyProductRow = serde_json::from_value(serde_json::json!({
            "partNumber": "BK-1", "name": "Bracket", "price": 20, "display": false
        })).unwrap();
        let product = Product::from(row);
        assert!(product.category_ids.is_empty());
        assert!(!product.display);
        assert_eq!(product.platform_id, None);
    }
}
