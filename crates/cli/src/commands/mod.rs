//! Command implementations.
//!
//! Commands print their results to stdout; logs and errors go to stderr.

#![allow(clippy::print_stdout)]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use duka_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

/// Format an amount in the configured display currency.
fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).to_string()
}
