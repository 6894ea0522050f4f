//! Scoped cart access for code that cannot take the cart as a parameter.
//!
//! Passing a [`CartStore`] explicitly is the normal way to share a cart.
//! For deeply nested consumers, [`provide`] makes a cart available to
//! everything running inside a future, and [`use_cart`] fetches it back.
//!
//! ```
//! # use std::sync::Arc;
//! # use go_marketplace_cart::{CartStore, MemoryStore, provide, use_cart, DEFAULT_STORAGE_KEY};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cart = CartStore::new(Arc::new(MemoryStore::new()), DEFAULT_STORAGE_KEY);
//!
//! provide(cart, async {
//!     let cart = use_cart().expect("inside provider");
//!     assert!(cart.products().await.is_empty());
//! })
//! .await;
//!
//! assert!(use_cart().is_err());
//! # }
//! ```

use std::future::Future;

use crate::error::{CartError, Result};
use crate::store::CartStore;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Run `future` with `cart` available through [`use_cart`].
///
/// Providers nest; the innermost one wins.
pub async fn provide<F>(cart: CartStore, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_CART.scope(cart, future).await
}

/// The cart supplied by the enclosing [`provide`] call.
///
/// # Errors
///
/// Returns `CartError::ContextMisuse` when called outside any provider.
pub fn use_cart() -> Result<CartStore> {
    CURRENT_CART
        .try_with(CartStore::clone)
        .map_err(|_| CartError::ContextMisuse)
}
