//! Cart error type.

use go_marketplace_core::ProductId;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not in the cart.
    #[error("product {0} has not been added to the cart yet")]
    NotFound(ProductId),

    /// Adding the product would push the cart total past what a price can
    /// hold.
    #[error("cart total overflows when adding product {0}")]
    Overflow(ProductId),

    /// The cart accessor was used outside a cart provider.
    #[error("use_cart must be used within a cart provider")]
    ContextMisuse,

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored cart could not be decoded or breaks a cart invariant.
    #[error("stored cart is corrupted: {0}")]
    Corrupted(String),

    /// The cart could not be encoded for storage.
    #[error("failed to serialize cart: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
