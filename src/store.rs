//! Postgres access. Parameterized SQL only; rules live in `pricing` and `fitment`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use crate::domain::aggregates::{Category, Coupon, Customer, MainCategory, Order, Payment, Platform, Product};
use crate::domain::value_objects::{Money, Percent};
use crate::{EcommerceError, Result};

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: i64,
    code: String,
    value: Decimal,
    value_type: String,
    min_subtotal: Option<Decimal>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    active: bool,
    included_product_ids: Vec<i64>,
    excluded_product_ids: Vec<i64>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = EcommerceError;
    fn try_from(r: CouponRow) -> Result<Self> {
        let value_type = r.value_type.parse().map_err(|e: crate::domain::aggregates::CouponError| EcommerceError::CorruptRow {
            table: "coupons", id: r.id.to_string(), reason: e.to_string(),
        })?;
        Ok(Coupon {
            id: r.id, code: r.code, value: r.value, value_type, min_subtotal: r.min_subtotal.map(Money::usd),
            start_date: r.start_date, end_date: r.end_date, active: r.active,
            included_product_ids: r.included_product_ids, excluded_product_ids: r.excluded_product_ids,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow { id: i64, role: String, dealer_tier: Option<i32>, dealer_discount: Option<Decimal> }

impl TryFrom<CustomerRow> for Customer {
    type Error = EcommerceError;
    fn try_from(r: CustomerRow) -> Result<Self> {
        let role = r.role.parse().map_err(|e: crate::domain::aggregates::customer::UnknownRole| EcommerceError::CorruptRow {
            table: "customers", id: r.id.to_string(), reason: e.to_string(),
        })?;
        Ok(Customer { id: Some(r.id), role, dealer_tier: r.dealer_tier, dealer_discount: r.dealer_discount.map(Percent::clamped) })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow { id: i64, part_number: String, name: String, price: Decimal, platform_id: Option<i64>, display: bool, category_ids: Vec<i64> }

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id, part_number: r.part_number, name: r.name, price: Money::usd(r.price), platform_id: r.platform_id,
            category_ids: r.category_ids.into_iter().collect(), display: r.display,
        }
    }
}

const COUPON_COLUMNS: &str = "id, code, value, value_type, min_subtotal, start_date, end_date, active, included_product_ids, excluded_product_ids";

const PRODUCT_SELECT: &str = "SELECT p.id, p.part_number, p.name, p.price, p.platform_id, p.display, \
    COALESCE(array_agg(pc.category_id) FILTER (WHERE pc.category_id IS NOT NULL), '{}') AS category_ids \
    FROM products p LEFT JOIN product_categories pc ON pc.product_id = p.id";

impl Store {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    // ---------------------------------------------------------------- coupons

    pub async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE UPPER(code) = $1");
        let row = sqlx::query_as::<_, CouponRow>(&sql).bind(Coupon::normalize_code(code)).fetch_optional(&self.pool).await?;
        row.map(Coupon::try_from).transpose()
    }

    pub async fn list_coupons(&self) -> Result<Vec<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, CouponRow>(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Coupon::try_from).collect()
    }

    /// Inserts `c` (its `id` is ignored) and returns the stored row.
    pub async fn insert_coupon(&self, c: &Coupon) -> Result<Coupon> {
        let code = Coupon::normalize_code(&c.code);
        let sql = format!("INSERT INTO coupons (code, value, value_type, min_subtotal, start_date, end_date, active, included_product_ids, excluded_product_ids) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COUPON_COLUMNS}");
        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(&code).bind(c.value).bind(c.value_type.as_str()).bind(c.min_subtotal.map(|m| m.amount()))
            .bind(c.start_date).bind(c.end_date).bind(c.active).bind(&c.included_product_ids).bind(&c.excluded_product_ids)
            .fetch_one(&self.pool).await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => EcommerceError::DuplicateCoupon(code.clone()),
                other => EcommerceError::StorageError(other),
            })?;
        Coupon::try_from(row)
    }

    /// Turns off every active coupon whose end date has passed. Returns how many changed.
    pub async fn deactivate_expired_coupons(&self, now: DateTime<Utc>) -> Result<u64> {
        let done = sqlx::query("UPDATE coupons SET active = FALSE WHERE active AND end_date IS NOT NULL AND end_date < $1")
            .bind(now).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    // -------------------------------------------------------------- customers

    pub async fn find_customer(&self, id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>("SELECT id, role, dealer_tier, dealer_discount FROM customers WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        row.map(Customer::try_from).transpose()
    }

    // ---------------------------------------------------------------- catalog

    pub async fn platforms(&self) -> Result<Vec<Platform>> {
        Ok(sqlx::query_as::<_, Platform>("SELECT id, name, make, model, start_year, end_year, slug FROM platforms ORDER BY name, id")
            .fetch_all(&self.pool).await?)
    }

    pub async fn main_categories(&self) -> Result<Vec<MainCategory>> {
        Ok(sqlx::query_as::<_, MainCategory>("SELECT id, name, slug FROM main_categories ORDER BY name, id")
            .fetch_all(&self.pool).await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(sqlx::query_as::<_, Category>("SELECT id, main_category_id, name, slug FROM categories ORDER BY name, id")
            .fetch_all(&self.pool).await?)
    }

    /// Every product built for the platform, hidden ones included; `fitment` filters.
    pub async fn products_for_platform(&self, platform_id: i64) -> Result<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.platform_id = $1 GROUP BY p.id ORDER BY p.name, p.id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql).bind(platform_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ANY($1) GROUP BY p.id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql).bind(ids).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Upserts by part number and replaces each product's category links.
    /// Category ids with no matching category are skipped. Returns how many rows were written.
    pub async fn import_products(&self, products: &[Product]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        for p in products {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO products (part_number, name, price, platform_id, display) VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (part_number) DO UPDATE SET name = EXCLUDED.name, price = EXCLUDED.price, \
                 platform_id = EXCLUDED.platform_id, display = EXCLUDED.display, updated_at = NOW() RETURNING id",
            )
            .bind(&p.part_number).bind(&p.name).bind(p.price.amount()).bind(p.platform_id).bind(p.display)
            .fetch_one(&mut *tx).await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    EcommerceError::PlatformNotFound(p.platform_id.map(|id| id.to_string()).unwrap_or_default())
                }
                other => EcommerceError::StorageError(other),
            })?;

            let category_ids: Vec<i64> = p.category_ids.iter().collect();
            sqlx::query("DELETE FROM product_categories WHERE product_id = $1").bind(id).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO product_categories (product_id, category_id) SELECT $1, id FROM categories WHERE id = ANY($2)")
                .bind(id).bind(&category_ids).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(products.len() as u64)
    }

    // ----------------------------------------------------------------- orders

    /// Writes the order and its items atomically.
    pub async fn insert_order(&self, order: &Order) -> Result<()> {
        let q = order.quote();
        let (token, paypal_id) = match order.payment() {
            Payment::Card { token_ciphertext } => (Some(token_ciphertext.as_str()), None),
            Payment::PayPal { paypal_order_id } => (None, Some(paypal_order_id.as_str())),
        };
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO orders (id, order_number, customer_id, customer_email, status, list_subtotal, dealer_discount, subtotal, \
                coupon_code, coupon_discount, tax, shipping_method, shipping, total, shipping_address, payment_method, \
                payment_token_ciphertext, paypal_order_id, created_at, updated_at) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $19)")
            .bind(order.id()).bind(order.order_number()).bind(order.customer_id()).bind(order.email()).bind(order.status().as_str())
            .bind(q.list_subtotal.amount()).bind(q.dealer_discount.amount()).bind(q.subtotal.amount())
            .bind(q.coupon_code.as_deref()).bind(q.coupon_discount.amount()).bind(q.tax.amount())
            .bind(q.shipping_method.as_str()).bind(q.shipping.amount()).bind(q.total.amount())
            .bind(order.shipping_address().map(sqlx::types::Json)).bind(order.payment().method())
            .bind(token).bind(paypal_id).bind(order.created_at())
            .execute(&mut *tx).await?;
        for item in order.items() {
            sqlx::query("INSERT INTO order_items (id, order_id, product_id, part_number, name, quantity, unit_price, total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)")
                .bind(Uuid::now_v7()).bind(order.id()).bind(item.product_id).bind(&item.part_number).bind(&item.name)
                .bind(item.quantity as i32).bind(item.unit_price.amount()).bind(item.total.amount())
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// The stored card-token ciphertext. `OrderNotFound` or `NoPaymentToken` when there is none.
    pub async fn payment_token_ciphertext(&self, order_id: Uuid) -> Result<String> {
        let row: Option<(Option<String>,)> = sqlx::query_as("SELECT payment_token_ciphertext FROM orders WHERE id = $1")
            .bind(order_id).fetch_optional(&self.pool).await?;
        match row {
            None => Err(EcommerceError::OrderNotFound),
            Some((None,)) => Err(EcommerceError::NoPaymentToken),
            Some((Some(ciphertext),)) => Ok(ciphertext),
        }
    }

    pub async fn log_payment_token_access(&self, order_id: Uuid, admin_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO payment_token_access_log (order_id, admin_id) VALUES ($1, $2)")
            .bind(order_id).bind(admin_id).execute(&self.pool).await?;
        Ok(())
    }
}
