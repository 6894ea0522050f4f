//! Core types for the Go Marketplace cart.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart_item;
pub mod id;
pub mod price;

pub use cart_item::{CartItem, NewCartItem};
pub use id::{ProductId, ProductIdError};
pub use price::Price;
