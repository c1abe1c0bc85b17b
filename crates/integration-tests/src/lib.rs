//! Integration tests for the Duka storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p duka-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart operations and notifications through the public API
//! - `cart_persistence` - File-backed slots: round trips, corruption, two processes
//! - `order_parsing` - Order history responses as the API sends them
//!
//! None of the tests need a running API; response handling is exercised
//! through the `parse_*` functions.

use duka_core::ProductId;
use duka_storefront::api::types::{Image, Product};
use rust_decimal::Decimal;

/// A catalog product with one image.
#[must_use]
pub fn product(id: &str, price: i64) -> Product {
    let mut product = Product::new(ProductId::new(id), format!("Product {id}"), Decimal::from(price));
    product.images = vec![Image::new(format!("https://cdn.example.com/{id}.png"))];
    product
}

/// Product ids of the cart lines, in order.
#[must_use]
pub fn ids<S: duka_storefront::cart::CartStorage>(
    cart: &duka_storefront::cart::CartStore<S>,
) -> Vec<String> {
    cart.items().iter().map(|i| i.id.to_string()).collect()
}
