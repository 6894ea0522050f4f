//! Cart line items.
//!
//! A [`CartItem`] is a product plus the quantity the shopper wants. The
//! serialized field names (`id`, `title`, `image_url`, `price`, `quantity`)
//! are the persisted format shared with the mobile app.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product being added to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl NewCartItem {
    /// Create a new cart item descriptor.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turn the descriptor into a line item with the given quantity.
    #[must_use]
    pub fn with_quantity(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line (unit price times quantity), or `None` if it
    /// does not fit in a `Price`.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.price.checked_times(self.quantity)
    }
}

impl From<NewCartItem> for CartItem {
    /// A freshly added product starts at quantity 1.
    fn from(item: NewCartItem) -> Self {
        item.with_quantity(1)
    }
}
