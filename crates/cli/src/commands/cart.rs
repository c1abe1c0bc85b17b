//! Cart commands.
//!
//! Everything except `add` works offline against the persisted cart. `add`
//! looks the product up in the catalog first so the line carries its name,
//! price and images.

use duka_core::ProductId;
use duka_storefront::cart::{CartEvent, CartStorage, CartStore};
use duka_storefront::error::{Result, add_breadcrumb};
use duka_storefront::state::AppState;

use super::money;

/// Print the cart contents and totals.
pub fn show(state: &AppState) {
    let cart = state.open_cart();
    print_cart(&cart, state);
}

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Returns an error if the API is not configured or the product cannot be
/// fetched.
pub async fn add(state: &AppState, product_id: &str) -> Result<()> {
    let id = ProductId::new(product_id);
    let product = state.catalog()?.product(&id).await?;

    let mut cart = state.open_cart();
    let event = cart.add_item(&product);
    announce(&event, &id);
    print_cart(&cart, state);
    Ok(())
}

/// Remove a line entirely.
pub fn remove(state: &AppState, product_id: &str) {
    let id = ProductId::new(product_id);
    let mut cart = state.open_cart();
    let event = cart.remove_item(&id);
    announce(&event, &id);
    print_cart(&cart, state);
}

/// Increase a line's quantity by one.
pub fn increase(state: &AppState, product_id: &str) {
    let id = ProductId::new(product_id);
    let mut cart = state.open_cart();
    let event = cart.increase_quantity(&id);
    announce(&event, &id);
    print_cart(&cart, state);
}

/// Decrease a line's quantity by one.
pub fn decrease(state: &AppState, product_id: &str) {
    let id = ProductId::new(product_id);
    let mut cart = state.open_cart();
    let event = cart.decrease_quantity(&id);
    announce(&event, &id);
    print_cart(&cart, state);
}

/// Empty the cart.
pub fn clear(state: &AppState) {
    let mut cart = state.open_cart();
    let event = cart.remove_all();
    if let Some(message) = event.message() {
        add_breadcrumb("cart", message, None);
        println!("{message}");
    }
}

/// Print the confirmation for `event` and leave a breadcrumb for it.
fn announce(event: &CartEvent, id: &ProductId) {
    match event {
        CartEvent::Unchanged => println!("{id} is not in your cart"),
        CartEvent::QuantityIncreased { quantity, .. }
        | CartEvent::QuantityDecreased { quantity, .. } => {
            add_breadcrumb("cart", "Quantity changed", Some(&[("product_id", id.as_str())]));
            println!("{id}: quantity {quantity}");
        }
        _ => {
            if let Some(message) = event.message() {
                add_breadcrumb("cart", message, Some(&[("product_id", id.as_str())]));
                println!("{message}");
            }
        }
    }
}

fn print_cart<S: CartStorage>(cart: &CartStore<S>, state: &AppState) {
    let currency = state.config().currency;

    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    println!();
    for item in cart.items() {
        println!(
            "  {:<12} {:<32} {:>4} x {:>14} = {:>14}",
            item.id.as_str(),
            item.name,
            item.quantity,
            money(item.price, currency),
            money(item.line_total(), currency),
        );
    }
    println!();
    println!(
        "  {} item(s), total {}",
        cart.total_quantity(),
        money(cart.total_price(), currency)
    );
}
