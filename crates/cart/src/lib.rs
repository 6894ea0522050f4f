//! Go Marketplace Cart - persistent shopping-cart state.
//!
//! Holds the shopper's cart in memory and mirrors every change to a
//! key-value store, so the cart survives restarts of the app.
//!
//! # Architecture
//!
//! - [`Cart`] - the ordered line collection and its rules (no I/O)
//! - [`CartStore`] - shared handle that sequences mutate-then-persist
//! - [`storage`] - the [`KeyValueStore`] trait with memory and file backends
//! - [`provide`] / [`use_cart`] - scoped access for nested consumers
//!
//! # Example
//!
//! ```
//! # use std::sync::Arc;
//! # use go_marketplace_cart::{CartStore, MemoryStore, DEFAULT_STORAGE_KEY};
//! # use go_marketplace_core::{NewCartItem, Price, ProductId};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cart = CartStore::open(Arc::new(MemoryStore::new()), DEFAULT_STORAGE_KEY).await?;
//!
//! let id = ProductId::parse("1")?;
//! cart.add_to_cart(NewCartItem::new(id.clone(), "Chair", "chair.png", Price::from_cents(4000)))
//!     .await?;
//! cart.increment(&id).await?;
//!
//! assert_eq!(cart.snapshot().await.item_count(), 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod error;
pub mod provider;
pub mod storage;
pub mod store;

pub use cart::Cart;
pub use error::{CartError, Result};
pub use provider::{provide, use_cart};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, DEFAULT_STORAGE_KEY};
