//! Persistent cart state container.
//!
//! [`CartStore`] owns the shopper's cart and mirrors it to a
//! [`KeyValueStore`] under a fixed key. It is cheaply cloneable via `Arc`;
//! every clone refers to the same cart.
//!
//! # Sequencing
//!
//! Each mutation takes the cart lock, computes the next cart on a copy,
//! writes that copy to storage, and only then commits it in memory. The lock
//! is held across the write, so overlapping mutations are serialized and the
//! stored snapshot always equals the committed in-memory cart. A failed
//! write leaves both untouched.

use std::sync::Arc;

use go_marketplace_core::{CartItem, NewCartItem, ProductId};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::cart::Cart;
use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;

/// Storage key the mobile app uses for the cart.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

/// Shared, persistent cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    cart: Mutex<Cart>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty cart backed by `storage` under `key`.
    ///
    /// Nothing is read from storage; call [`CartStore::load`] or use
    /// [`CartStore::open`] to pick up a previously persisted cart.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                key: key.into(),
                cart: Mutex::new(Cart::new()),
            }),
        }
    }

    /// Create a cart backed by `storage` and load its persisted state.
    ///
    /// # Errors
    ///
    /// See [`CartStore::load`].
    pub async fn open(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let store = Self::new(storage, key);
        store.load().await?;
        Ok(store)
    }

    /// The storage key this cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Replace the in-memory cart with the persisted one.
    ///
    /// If nothing is stored under the key, the cart is left as it is.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the read fails, or
    /// `CartError::Corrupted` if the stored value is not a valid cart. The
    /// in-memory cart is unchanged on error.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn load(&self) -> Result<()> {
        let mut cart = self.inner.cart.lock().await;

        let Some(stored) = self.inner.storage.get(&self.inner.key).await? else {
            tracing::debug!("No stored cart");
            return Ok(());
        };

        match Cart::decode(&stored) {
            Ok(loaded) => {
                tracing::debug!(lines = loaded.len(), "Cart loaded");
                *cart = loaded;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored cart is corrupted");
                Err(e)
            }
        }
    }

    /// Snapshot of the cart lines, in cart order.
    pub async fn products(&self) -> Vec<CartItem> {
        self.inner.cart.lock().await.items().to_vec()
    }

    /// Snapshot of the whole cart.
    pub async fn snapshot(&self) -> Cart {
        self.inner.cart.lock().await.clone()
    }

    /// Add a product to the cart and persist.
    ///
    /// A new product is appended with quantity 1; a product already in the
    /// cart is incremented. Returns the cart after the change.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Overflow` if the cart total would no longer fit
    /// in a price, or `CartError::Storage` / `CartError::Serialization` if
    /// the cart cannot be persisted.
    #[instrument(skip(self, item), fields(key = %self.inner.key, product_id = %item.id))]
    pub async fn add_to_cart(&self, item: NewCartItem) -> Result<Cart> {
        self.mutate(|cart| {
            let quantity = cart.add(item)?;
            tracing::info!(quantity, "Product added to cart");
            Ok(())
        })
        .await
    }

    /// Increase a product's quantity by one and persist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product is not in the cart, or a
    /// storage error if the cart cannot be persisted.
    #[instrument(skip(self), fields(key = %self.inner.key, product_id = %id))]
    pub async fn increment(&self, id: &ProductId) -> Result<Cart> {
        self.mutate(|cart| {
            let quantity = cart.increment(id)?;
            tracing::info!(quantity, "Product incremented");
            Ok(())
        })
        .await
    }

    /// Decrease a product's quantity by one, removing it at zero, and persist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product is not in the cart, or a
    /// storage error if the cart cannot be persisted.
    #[instrument(skip(self), fields(key = %self.inner.key, product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> Result<Cart> {
        self.mutate(|cart| {
            let quantity = cart.decrement(id)?;
            if quantity == 0 {
                tracing::info!("Product removed from cart");
            } else {
                tracing::info!(quantity, "Product decremented");
            }
            Ok(())
        })
        .await
    }

    /// Empty the cart and delete it from storage.
    ///
    /// A later `load` finds no stored cart and starts empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored cart cannot be removed. The
    /// in-memory cart is left unchanged.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn clear(&self) -> Result<Cart> {
        let mut current = self.inner.cart.lock().await;

        self.inner.storage.remove(&self.inner.key).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to remove stored cart");
            CartError::from(e)
        })?;
        current.clear();
        tracing::info!("Cart cleared");
        Ok(current.clone())
    }

    /// Apply `change` to a copy of the cart, persist the copy, then commit it.
    async fn mutate<F>(&self, change: F) -> Result<Cart>
    where
        F: FnOnce(&mut Cart) -> Result<()>,
    {
        let mut current = self.inner.cart.lock().await;

        let mut next = current.clone();
        change(&mut next)?;

        self.persist(&next).await?;
        *current = next.clone();
        Ok(next)
    }

    async fn persist(&self, cart: &Cart) -> Result<()> {
        let encoded = cart.encode()?;
        self.inner
            .storage
            .set(&self.inner.key, &encoded)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to persist cart");
                CartError::from(e)
            })?;
        tracing::debug!(lines = cart.len(), "Cart persisted");
        Ok(())
    }
}
