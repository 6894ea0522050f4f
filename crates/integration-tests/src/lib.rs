//! Integration tests for the Go Marketplace cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart state surviving restarts over the file store
//! - `cart_provider` - Scoped cart access from nested consumers
//!
//! Shared fixtures live in this crate so every test file builds products the
//! same way.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;

use go_marketplace_cart::{CartStore, FileStore, Result, DEFAULT_STORAGE_KEY};
use go_marketplace_core::{NewCartItem, Price, ProductId};

/// Build a product descriptor with a predictable title and image.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: &str, cents: i64) -> NewCartItem {
    NewCartItem::new(
        ProductId::parse(id).expect("fixture product id"),
        format!("Product {id}"),
        format!("https://example.com/{id}.png"),
        Price::from_cents(cents),
    )
}

/// Parse a product id.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product_id(id: &str) -> ProductId {
    ProductId::parse(id).expect("fixture product id")
}

/// Open the default cart stored under `dir`.
///
/// # Errors
///
/// Returns the error from [`CartStore::open`].
pub async fn open_cart(dir: &Path) -> Result<CartStore> {
    CartStore::open(Arc::new(FileStore::new(dir)), DEFAULT_STORAGE_KEY).await
}
