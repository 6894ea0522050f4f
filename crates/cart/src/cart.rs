//! The cart collection and its mutation rules.
//!
//! [`Cart`] is plain data: it knows how to add, increment, and decrement
//! lines while keeping its invariants, and how to encode itself for storage.
//! It does no I/O. [`CartStore`](crate::CartStore) wraps it with locking and
//! persistence.
//!
//! # Invariants
//!
//! - No two lines share a [`ProductId`].
//! - Every line has a quantity of at least 1. A line that would drop to 0 is
//!   removed.
//! - Lines keep their insertion order. New products are appended; changing a
//!   quantity never moves a line.
//! - The subtotal fits in a [`Price`]. A change that would overflow it is
//!   refused and leaves the cart as it was.

use std::collections::HashSet;

use go_marketplace_core::{CartItem, NewCartItem, Price, ProductId};
use serde::Serialize;

use crate::error::{CartError, Result};

/// An ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Corrupted` if two lines share an id, a line has
    /// a quantity of zero, or the subtotal does not fit in a `Price`.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(CartError::Corrupted(format!(
                    "duplicate product id {}",
                    item.id
                )));
            }
            if item.quantity == 0 {
                return Err(CartError::Corrupted(format!(
                    "product {} has quantity 0",
                    item.id
                )));
            }
        }

        let cart = Self { items };
        if cart.checked_subtotal().is_none() {
            return Err(CartError::Corrupted("cart total overflows".to_string()));
        }
        Ok(cart)
    }

    /// Decode a cart from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Corrupted` if the value is not a JSON array of
    /// cart lines or breaks a cart invariant.
    pub fn decode(json: &str) -> Result<Self> {
        let items: Vec<CartItem> =
            serde_json::from_str(json).map_err(|e| CartError::Corrupted(e.to_string()))?;
        Self::from_items(items)
    }

    /// Encode the cart to its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Serialization` if encoding fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// The lines, in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether the product is in the cart.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of every line's total.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        // Every constructor and mutation keeps the subtotal in range
        self.checked_subtotal().unwrap_or(Price::MAX)
    }

    fn checked_subtotal(&self) -> Option<Price> {
        self.items
            .iter()
            .try_fold(Price::ZERO, |acc, item| acc.checked_add(item.line_total()?))
    }

    /// Add a product.
    ///
    /// A product not yet in the cart is appended with quantity 1. A product
    /// already in the cart is incremented instead. Returns the line's new
    /// quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Overflow` if the new subtotal would not fit in a
    /// `Price`. The cart is left unchanged.
    pub fn add(&mut self, item: NewCartItem) -> Result<u32> {
        if self.contains(&item.id) {
            return self.increment(&item.id);
        }

        let id = item.id.clone();
        self.items.push(CartItem::from(item));
        if self.checked_subtotal().is_none() {
            self.items.pop();
            return Err(CartError::Overflow(id));
        }
        Ok(1)
    }

    /// Increase a line's quantity by one. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product is not in the cart, and
    /// `CartError::Overflow` if the quantity or subtotal would overflow. The
    /// cart is left unchanged on error.
    pub fn increment(&mut self, id: &ProductId) -> Result<u32> {
        let subtotal = self.subtotal();
        let line = self
            .line_mut(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        let quantity = line
            .quantity
            .checked_add(1)
            .filter(|&quantity| line.price.checked_times(quantity).is_some())
            .filter(|_| subtotal.checked_add(line.price).is_some())
            .ok_or_else(|| CartError::Overflow(id.clone()))?;
        line.quantity = quantity;
        Ok(quantity)
    }

    /// Decrease a line's quantity by one, removing the line when it reaches
    /// zero. Returns the new quantity (0 when removed).
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product is not in the cart.
    pub fn decrement(&mut self, id: &ProductId) -> Result<u32> {
        let (index, line) = self
            .items
            .iter_mut()
            .enumerate()
            .find(|(_, item)| &item.id == id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        line.quantity = line.quantity.saturating_sub(1);
        let remaining = line.quantity;

        if remaining == 0 {
            self.items.remove(index);
        }
        Ok(remaining)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn product(s: &str, cents: i64) -> NewCartItem {
        NewCartItem::new(
            id(s),
            format!("Product {s}"),
            format!("https://example.com/{s}.png"),
            Price::from_cents(cents),
        )
    }

    #[test]
    fn test_add_new_product_appends_with_quantity_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(product("A", 1000)).unwrap(), 1);
        assert_eq!(cart.add(product("B", 500)).unwrap(), 1);

        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
        assert!(cart.items().iter().all(|i| i.quantity == 1));
    }

    #[test]
    fn test_add_existing_product_increments() {
        let mut cart = Cart::new();
        cart.add(product("A", 1000)).unwrap();
        assert_eq!(cart.add(product("A", 1000)).unwrap(), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&id("A")).unwrap().quantity, 2);
    }

    #[test]
    fn test_increment_keeps_position() {
        let mut cart = Cart::new();
        cart.add(product("A", 1000)).unwrap();
        cart.add(product("B", 500)).unwrap();
        cart.add(product("C", 250)).unwrap();

        assert_eq!(cart.increment(&id("A")).unwrap(), 2);

        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_increment_missing_product() {
        let mut cart = Cart::new();
        cart.add(product("A", 1000)).unwrap();
        let before = cart.clone();

        let err = cart.increment(&id("Z")).unwrap_err();
        assert!(matches!(err, CartError::NotFound(ref missing) if missing == "Z"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_above_one() {
        let mut cart = Cart::new();
        cart.add(product("A", 1000)).unwrap();
        cart.add(product("B", 500)).unwrap();
        cart.increment(&id("B")).unwrap();

        assert_eq!(cart.decrement(&id("B")).unwrap(), 1);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[1].id, "B");
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let mut cart = Cart::new();
        cart.add(product("A", 1000)).unwrap();
        cart.add(product("B", 500)).unwrap();

        assert_eq!(cart.decrement(&id("A")).unwrap(), 0);
        assert_eq!(cart.len(), 1);
        assert!(!cart.contains(&id("A")));
    }

    #[test]
    fn test_decrement_missing_product() {
        let mut cart = Cart::new();
        let err = cart.decrement(&id("A")).unwrap_err();
        assert!(matches!(err, CartError::NotFound(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lifecycle_scenario() {
        let mut cart = Cart::new();
        cart.add(product("A", 1000)).unwrap();
        assert_eq!(cart.get(&id("A")).unwrap().quantity, 1);
        cart.increment(&id("A")).unwrap();
        assert_eq!(cart.get(&id("A")).unwrap().quantity, 2);
        cart.decrement(&id("A")).unwrap();
        assert_eq!(cart.get(&id("A")).unwrap().quantity, 1);
        cart.decrement(&id("A")).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.decrement(&id("A")),
            Err(CartError::NotFound(_))
        ));
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(product("A", 1050)).unwrap();
        cart.add(product("A", 1050)).unwrap();
        cart.add(product("B", 199)).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(2299));
        assert_eq!(Cart::new().subtotal(), Price::ZERO);
    }

    #[test]
    fn test_encode_decode_preserves_order() {
        let mut cart = Cart::new();
        cart.add(product("B", 500)).unwrap();
        cart.add(product("A", 1000)).unwrap();
        cart.increment(&id("B")).unwrap();

        let decoded = Cart::decode(&cart.encode().unwrap()).unwrap();
        assert_eq!(decoded, cart);
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(matches!(
            Cart::decode("{not json"),
            Err(CartError::Corrupted(_))
        ));
        assert!(matches!(
            Cart::decode(r#"{"id": "A"}"#),
            Err(CartError::Corrupted(_))
        ));
    }

    #[test]
    fn test_decode_rejects_duplicates_and_zero_quantity() {
        let line = r#"{"id":"A","title":"A","image_url":"a.png","price":1,"quantity":1}"#;
        let duplicated = format!("[{line},{line}]");
        assert!(matches!(
            Cart::decode(&duplicated),
            Err(CartError::Corrupted(msg)) if msg.contains("duplicate")
        ));

        let zero = r#"[{"id":"A","title":"A","image_url":"a.png","price":1,"quantity":0}]"#;
        assert!(matches!(Cart::decode(zero), Err(CartError::Corrupted(_))));
    }

    #[test]
    fn test_decode_rejects_blank_id() {
        let blank = r#"[{"id":"  ","title":"A","image_url":"a.png","price":1,"quantity":1}]"#;
        assert!(matches!(Cart::decode(blank), Err(CartError::Corrupted(_))));
    }

    #[test]
    fn test_decode_rejects_overflowing_total() {
        let line = r#"[{"id":"A","title":"A","image_url":"a.png","price":"50000000000000000000000000000","quantity":2}]"#;
        assert!(matches!(
            Cart::decode(line),
            Err(CartError::Corrupted(msg)) if msg.contains("overflows")
        ));

        // Each line fits on its own but the sum does not
        let two = r#"[
            {"id":"A","title":"A","image_url":"a.png","price":"50000000000000000000000000000","quantity":1},
            {"id":"B","title":"B","image_url":"b.png","price":"50000000000000000000000000000","quantity":1}
        ]"#;
        assert!(matches!(Cart::decode(two), Err(CartError::Corrupted(_))));
    }

    #[test]
    fn test_add_and_increment_refuse_overflow() {
        let huge: Price = "50000000000000000000000000000".parse().unwrap();
        let mut cart = Cart::new();
        cart.add(NewCartItem::new(id("A"), "A", "a.png", huge)).unwrap();
        let before = cart.clone();

        assert!(matches!(
            cart.increment(&id("A")),
            Err(CartError::Overflow(ref overflowing)) if overflowing == "A"
        ));
        assert!(matches!(
            cart.add(NewCartItem::new(id("A"), "A", "a.png", huge)),
            Err(CartError::Overflow(_))
        ));
        assert!(matches!(
            cart.add(NewCartItem::new(id("B"), "B", "b.png", huge)),
            Err(CartError::Overflow(_))
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.subtotal(), huge);
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(Cart::decode("[]").unwrap().is_empty());
    }
}
