//! Checkout commands.
//!
//! `start` sends the cart to the API and prints the payment reference the
//! customer completes with the payment provider. The cart is left alone until
//! `confirm` is run with that reference.

use duka_storefront::api::{CheckoutDetails, CheckoutForm};
use duka_storefront::error::{Result, add_breadcrumb, set_sentry_user};
use duka_storefront::state::AppState;

use super::money;

/// Validate the form, submit the cart and print the payment session.
///
/// # Errors
///
/// Returns an error if the form is invalid, the cart is empty, or the API
/// rejects the checkout.
pub async fn start(state: &AppState, form: &CheckoutForm) -> Result<()> {
    let details = CheckoutDetails::new(form)?;
    set_sentry_user(details.email().as_str());

    let cart = state.open_cart();
    let session = state
        .checkout()?
        .start(&cart.checkout_lines(), &details)
        .await?;

    add_breadcrumb(
        "checkout",
        "Payment session created",
        Some(&[("reference", session.reference.as_str())]),
    );

    let config = state.config();
    println!("Payment reference: {}", session.reference);
    println!("Amount:            {}", money(session.major_amount(), config.currency));
    if !session.email.is_empty() {
        println!("Receipt to:        {}", session.email);
    }
    if let Some(key) = &config.paystack_public_key {
        println!("Public key:        {key}");
    }
    println!();
    println!("Complete the payment, then run: duka checkout confirm {}", session.reference);
    Ok(())
}

/// Record a successful payment by emptying the cart.
pub fn confirm(state: &AppState, reference: &str) {
    let mut cart = state.open_cart();
    let event = cart.remove_all();
    tracing::info!(reference, "Payment confirmed, cart cleared");
    add_breadcrumb("checkout", "Payment confirmed", Some(&[("reference", reference)]));

    println!("Payment complete! Reference: {reference}");
    if let Some(message) = event.message() {
        println!("{message}");
    }
}
