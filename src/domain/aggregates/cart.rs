//! Cart Aggregate

use crate::domain::value_objects::Money;

/// Largest quantity of a single part accepted in one cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    subtotal: Money,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> Money { self.subtotal }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity(item.product_id)); }
        if item.unit_price.is_negative() { return Err(CartError::InvalidPrice(item.product_id)); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity
                .checked_add(item.quantity)
                .filter(|q| *q <= MAX_LINE_QUANTITY)
                .ok_or(CartError::InvalidQuantity(item.product_id))?;
        } else {
            if item.quantity > MAX_LINE_QUANTITY { return Err(CartError::InvalidQuantity(item.product_id)); }
            self.items.push(item);
        }
        self.recalculate();
        Ok(())
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().map(CartItem::line_total).sum();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(i64),
    #[error("Invalid price for product {0}")]
    InvalidPrice(i64),
}
