//! Order history commands.

use duka_core::{Email, OrderId};
use duka_storefront::api::types::Order;
use duka_storefront::error::{AppError, Result, set_sentry_user};
use duka_storefront::state::AppState;

use super::money;

/// List a customer's orders, newest first.
///
/// # Errors
///
/// Returns an error if the email is invalid, the store id or API is not
/// configured, or the API answers with an error status.
pub async fn list(state: &AppState, email: &str) -> Result<()> {
    let email = Email::parse(email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let store_id = state.config().require_store_id()?;
    set_sentry_user(email.as_str());

    let orders = state.orders()?.customer_orders(store_id, &email).await?;
    if orders.is_empty() {
        println!("No orders found for {email}");
        return Ok(());
    }

    let currency = state.config().currency;
    for order in &orders {
        println!(
            "{:<14} {}  {:<16} {:>3} item(s) {:>14}  {}",
            order.id.as_str(),
            order.created_at.format("%Y-%m-%d"),
            order.delivery_status.label(),
            order.item_count(),
            money(order.total(), currency),
            if order.is_paid { "paid" } else { "unpaid" },
        );
    }
    Ok(())
}

/// Show a single order with its lines and tracking history.
///
/// # Errors
///
/// Returns an error if the store id or API is not configured, or the order
/// cannot be fetched.
pub async fn show(state: &AppState, order_id: &str) -> Result<()> {
    let store_id = state.config().require_store_id()?;
    let order = state
        .orders()?
        .order(store_id, &OrderId::new(order_id))
        .await?;
    print_order(&order, state);
    Ok(())
}

fn print_order(order: &Order, state: &AppState) {
    let currency = state.config().currency;

    println!("Order {}", order.id);
    println!("  Placed:   {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  Status:   {}", order.delivery_status.label());
    println!("  Paid:     {}", if order.is_paid { "yes" } else { "no" });
    if let Some(tracking_id) = &order.tracking_id {
        println!("  Tracking: {tracking_id}");
    }
    println!("  Deliver:  {}, {}, {}", order.customer_name, order.address, order.county);

    println!();
    for item in &order.order_items {
        println!(
            "  {:<32} {:>4} x {:>14}",
            item.product.name,
            item.quantity,
            money(item.product.price, currency),
        );
    }
    println!("  Total: {}", money(order.total(), currency));

    if !order.tracking_updates.is_empty() {
        println!();
        let mut updates: Vec<_> = order.tracking_updates.iter().collect();
        updates.sort_by_key(|u| u.timestamp);
        for update in updates {
            println!(
                "  {}  {:<16} {} {}",
                update.timestamp.format("%Y-%m-%d %H:%M"),
                update.status.label(),
                update.location.as_deref().unwrap_or(""),
                update.note.as_deref().unwrap_or(""),
            );
        }
    }
}
