//! Client-side shopping cart.
//!
//! The cart is owned entirely by the client: there is no server-side
//! counterpart until checkout. [`CartStore`] holds the line items and the
//! quantity arithmetic, and writes a snapshot through an injected
//! [`CartStorage`] after every mutation.
//!
//! # Invariants
//!
//! - Line items are unique by product id; adding a product that is already in
//!   the cart increments its quantity instead.
//! - Every line item has `quantity >= 1`. Decreasing a line at quantity 1
//!   removes it.
//! - Insertion order is preserved for lines that are not removed.
//!
//! # Concurrency
//!
//! Mutations take `&mut self`, so each one is a complete read-modify-write.
//! Two stores opened on the same storage slot (two terminals, two processes)
//! do not see each other's changes: each rehydrates once when opened and the
//! last one to write wins.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cart = CartStore::open(FileStorage::new(&config.data_dir));
//!
//! let event = cart.add_item(&product);
//! if let Some(message) = event.message() {
//!     println!("{message}");
//! }
//! ```

pub mod persist;
pub mod storage;

use duka_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::types::{Image, Product};

pub use persist::CART_STORAGE_KEY;
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

// =============================================================================
// State
// =============================================================================

/// One product in the cart, with the display fields captured when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<Image>,
    pub quantity: u32,
}

impl CartLineItem {
    /// Snapshot a product as a new line with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            images: product.images.clone(),
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Everything the cart persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartLineItem>,
}

impl CartState {
    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }
}

/// A `{id, quantity}` pair as sent to the checkout endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub id: ProductId,
    pub quantity: u32,
}

// =============================================================================
// Events
// =============================================================================

/// What a cart mutation did.
///
/// Returned by every mutation so callers can decide how (or whether) to tell
/// the user. The store itself never renders anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new line was appended.
    ItemAdded { id: ProductId },
    /// An existing line went up by one.
    QuantityIncreased { id: ProductId, quantity: u32 },
    /// An existing line went down by one and is still in the cart.
    QuantityDecreased { id: ProductId, quantity: u32 },
    /// The line for `id` is no longer in the cart.
    ItemRemoved { id: ProductId },
    /// Every line was removed.
    Cleared,
    /// The id was not in the cart; nothing changed.
    Unchanged,
}

impl CartEvent {
    /// Confirmation text for events that warrant a notification.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::ItemAdded { .. } => Some("Product added to cart"),
            Self::ItemRemoved { .. } => Some("Product removed from cart"),
            Self::Cleared => Some("Cart cleared"),
            Self::QuantityIncreased { .. } | Self::QuantityDecreased { .. } | Self::Unchanged => {
                None
            }
        }
    }

    /// Whether the cart contents changed.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

// =============================================================================
// Store
// =============================================================================

/// The cart state container.
///
/// Construct once per process with [`CartStore::open`]; every mutation is
/// followed by a best-effort write of the full state to `storage`.
pub struct CartStore<S> {
    state: CartState,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart, rehydrating from `storage`.
    ///
    /// A missing or unreadable snapshot yields an empty cart.
    pub fn open(storage: S) -> Self {
        let state = persist::load(&storage);
        debug!(
            lines = state.items.len(),
            quantity = state.total_quantity(),
            "Cart opened"
        );
        Self { state, storage }
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart this is the same as
    /// [`increase_quantity`](Self::increase_quantity); the stored snapshot is
    /// not refreshed from `product`.
    pub fn add_item(&mut self, product: &Product) -> CartEvent {
        if self.state.contains(&product.id) {
            return self.increase_quantity(&product.id);
        }

        self.state.items.push(CartLineItem::from_product(product));
        debug!(product_id = %product.id, "Cart line added");
        self.commit();

        CartEvent::ItemAdded {
            id: product.id.clone(),
        }
    }

    /// Remove the line for `id`.
    ///
    /// Always reports [`CartEvent::ItemRemoved`], even when `id` was not in
    /// the cart; the customer still gets the removal confirmation.
    pub fn remove_item(&mut self, id: &ProductId) -> CartEvent {
        let before = self.state.items.len();
        self.state.items.retain(|item| &item.id != id);
        debug!(
            product_id = %id,
            present = self.state.items.len() != before,
            "Cart line removed"
        );
        self.commit();

        CartEvent::ItemRemoved { id: id.clone() }
    }

    /// Empty the cart.
    pub fn remove_all(&mut self) -> CartEvent {
        self.state.items.clear();
        debug!("Cart cleared");
        self.commit();
        CartEvent::Cleared
    }

    /// Add one to the quantity of `id`, if present.
    pub fn increase_quantity(&mut self, id: &ProductId) -> CartEvent {
        let event = match self.state.line_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartEvent::QuantityIncreased {
                    id: id.clone(),
                    quantity: item.quantity,
                }
            }
            None => CartEvent::Unchanged,
        };
        self.commit();
        event
    }

    /// Subtract one from the quantity of `id`, removing the line at 1.
    pub fn decrease_quantity(&mut self, id: &ProductId) -> CartEvent {
        let Some(item) = self.state.line_mut(id) else {
            self.commit();
            return CartEvent::Unchanged;
        };

        if item.quantity <= 1 {
            return self.remove_item(id);
        }

        item.quantity -= 1;
        let quantity = item.quantity;
        self.commit();

        CartEvent::QuantityDecreased {
            id: id.clone(),
            quantity,
        }
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.state.total_quantity()
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.total_price()
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.state.items
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.state.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// The full state, as it would be persisted.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// The `{id, quantity}` pairs consumed by checkout.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.state
            .items
            .iter()
            .map(|item| CheckoutLine {
                id: item.id.clone(),
                quantity: item.quantity,
            })
            .collect()
    }

    /// The injected storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn commit(&self) {
        persist::save(&self.storage, &self.state);
    }
}
