//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart list
//!
//! # Add a product (or bump its quantity if already present)
//! gm-cart add --id 1 --title "Cadeira Rivatti" --image-url https://example.com/1.png --price 1800
//!
//! # Change quantities
//! gm-cart increment 1
//! gm-cart decrement 1
//!
//! # Empty the cart
//! gm-cart clear
//! ```
//!
//! Every command prints the resulting cart, as text or (with `--json`) as
//! the stored JSON array.

use std::fmt::Write as _;

use go_marketplace_cart::{Cart, CartError, CartStore};
use go_marketplace_core::{NewCartItem, Price, ProductId, ProductIdError};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Invalid product id argument.
    #[error("Invalid product id: {0}")]
    InvalidProductId(#[from] ProductIdError),

    /// Invalid price argument.
    #[error("Invalid price {0}: {1}")]
    InvalidPrice(String, String),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// How a cart is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Arguments of the `add` command.
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: String,
}

/// Show the cart.
pub async fn list(store: &CartStore, mode: OutputMode) -> Result<String, CommandError> {
    render(&store.snapshot().await, mode)
}

/// Add a product to the cart.
pub async fn add(
    store: &CartStore,
    args: AddArgs,
    mode: OutputMode,
) -> Result<String, CommandError> {
    let id = ProductId::parse(&args.id)?;
    let price = args
        .price
        .parse::<Price>()
        .map_err(|e| CommandError::InvalidPrice(args.price.clone(), e.to_string()))?;

    let cart = store
        .add_to_cart(NewCartItem::new(id, args.title, args.image_url, price))
        .await?;
    render(&cart, mode)
}

/// Increase a product's quantity by one.
pub async fn increment(
    store: &CartStore,
    id: &str,
    mode: OutputMode,
) -> Result<String, CommandError> {
    let cart = store.increment(&ProductId::parse(id)?).await?;
    render(&cart, mode)
}

/// Decrease a product's quantity by one, removing it at zero.
pub async fn decrement(
    store: &CartStore,
    id: &str,
    mode: OutputMode,
) -> Result<String, CommandError> {
    let cart = store.decrement(&ProductId::parse(id)?).await?;
    render(&cart, mode)
}

/// Empty the cart.
pub async fn clear(store: &CartStore, mode: OutputMode) -> Result<String, CommandError> {
    let cart = store.clear().await?;
    render(&cart, mode)
}

fn render(cart: &Cart, mode: OutputMode) -> Result<String, CommandError> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(cart)?),
        OutputMode::Text => Ok(render_text(cart)),
    }
}

/// Human-readable cart listing.
fn render_text(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for item in cart {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>3} x {:>10} = {:>10}",
            item.id.as_str(),
            item.title,
            item.quantity,
            item.price.to_string(),
            item.line_total()
                .map_or_else(|| "overflow".to_string(), |total| total.to_string()),
        );
    }
    let _ = write!(
        out,
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    );
    out
}
